use itertools::Itertools;
use std::fmt;

/// Backend value types.
///
/// `Mem` is the linear memory token threaded through every effect, `Frame`
/// the handle of a function's addressable storage scope. `Fn` is a
/// continuation signature: continuations never return, they jump.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Mem,
    Frame,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Ptr(Box<Ty>),
    Array { elem: Box<Ty>, len: Option<u64> },
    Tuple(Vec<Ty>),
    Struct { name: String, fields: Vec<Ty> },
    /// Reference to a named aggregate whose layout is still being built.
    Opaque(String),
    Fn(Vec<Ty>),
    Bottom,
}

impl Ty {
    pub fn unit() -> Ty {
        Ty::Tuple(Vec::new())
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Ty::Tuple(elems) if elems.is_empty())
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Ty::I8 | Ty::I16 | Ty::I32 | Ty::I64)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, Ty::U8 | Ty::U16 | Ty::U32 | Ty::U64)
    }

    pub fn is_int(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Ty::F32 | Ty::F64)
    }

    pub fn bit_width(&self) -> Option<u32> {
        Some(match self {
            Ty::Bool => 1,
            Ty::I8 | Ty::U8 => 8,
            Ty::I16 | Ty::U16 => 16,
            Ty::I32 | Ty::U32 | Ty::F32 => 32,
            Ty::I64 | Ty::U64 | Ty::F64 => 64,
            _ => return None,
        })
    }

    pub fn fn_params(&self) -> Option<&[Ty]> {
        match self {
            Ty::Fn(params) => Some(params),
            _ => None,
        }
    }

    pub fn pointee(&self) -> Option<&Ty> {
        match self {
            Ty::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    /// Type of the element selected by `index` in an aggregate of this type.
    /// Arrays ignore the index; tuples and structs need a constant one.
    pub fn element(&self, index: Option<u64>) -> Option<Ty> {
        match self {
            Ty::Array { elem, .. } => Some(elem.as_ref().clone()),
            Ty::Tuple(elems) | Ty::Struct { fields: elems, .. } => {
                index.and_then(|i| elems.get(i as usize)).cloned()
            }
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Mem => write!(f, "mem"),
            Ty::Frame => write!(f, "frame"),
            Ty::Bool => write!(f, "bool"),
            Ty::I8 => write!(f, "i8"),
            Ty::I16 => write!(f, "i16"),
            Ty::I32 => write!(f, "i32"),
            Ty::I64 => write!(f, "i64"),
            Ty::U8 => write!(f, "u8"),
            Ty::U16 => write!(f, "u16"),
            Ty::U32 => write!(f, "u32"),
            Ty::U64 => write!(f, "u64"),
            Ty::F32 => write!(f, "f32"),
            Ty::F64 => write!(f, "f64"),
            Ty::Ptr(inner) => write!(f, "{}*", inner),
            Ty::Array { elem, len: Some(len) } => write!(f, "[{}; {}]", elem, len),
            Ty::Array { elem, len: None } => write!(f, "[{}]", elem),
            Ty::Tuple(elems) => write!(f, "({})", elems.iter().join(", ")),
            Ty::Struct { name, .. } => write!(f, "%{}", name),
            Ty::Opaque(name) => write!(f, "%{}", name),
            Ty::Fn(params) => write!(f, "fn({})", params.iter().join(", ")),
            Ty::Bottom => write!(f, "⊥"),
        }
    }
}
