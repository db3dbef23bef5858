//! JVM type, method and generic-signature descriptors.

use std::fmt;

/// A JVM type from a descriptor string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Void,
    Object(String),
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Parse a single type descriptor starting at byte `pos` in `desc`.
    /// Returns the descriptor and the position just past it.
    pub fn parse_at(desc: &str, pos: usize) -> Option<(TypeDescriptor, usize)> {
        let bytes = desc.as_bytes();
        match bytes.get(pos)? {
            b'B' => Some((TypeDescriptor::Byte, pos + 1)),
            b'C' => Some((TypeDescriptor::Char, pos + 1)),
            b'D' => Some((TypeDescriptor::Double, pos + 1)),
            b'F' => Some((TypeDescriptor::Float, pos + 1)),
            b'I' => Some((TypeDescriptor::Int, pos + 1)),
            b'J' => Some((TypeDescriptor::Long, pos + 1)),
            b'S' => Some((TypeDescriptor::Short, pos + 1)),
            b'Z' => Some((TypeDescriptor::Boolean, pos + 1)),
            b'V' => Some((TypeDescriptor::Void, pos + 1)),
            b'L' => {
                let semi = desc[pos + 1..].find(';')?;
                let class_name = &desc[pos + 1..pos + 1 + semi];
                Some((
                    TypeDescriptor::Object(class_name.to_string()),
                    pos + 1 + semi + 1,
                ))
            }
            b'[' => {
                let (inner, next) = TypeDescriptor::parse_at(desc, pos + 1)?;
                Some((TypeDescriptor::Array(Box::new(inner)), next))
            }
            _ => None,
        }
    }

    /// Parse a full type descriptor string. The whole input must be consumed.
    pub fn parse(desc: &str) -> Option<TypeDescriptor> {
        match TypeDescriptor::parse_at(desc, 0)? {
            (ty, next) if next == desc.len() => Some(ty),
            _ => None,
        }
    }

    /// The number of local-variable/operand-stack slots this type occupies.
    pub fn size(&self) -> u16 {
        match self {
            TypeDescriptor::Long | TypeDescriptor::Double => 2,
            _ => 1,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescriptor::Void)
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, TypeDescriptor::Object(_) | TypeDescriptor::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeDescriptor::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDescriptor::Array(_))
    }

    /// The element type of an array descriptor.
    pub fn array_element(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Array(inner) => Some(inner),
            _ => None,
        }
    }

    /// The internal class name of an object descriptor.
    pub fn object_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Rewrite every class name through `f`, keeping names `f` has no
    /// replacement for.
    pub fn remap(&self, f: &impl Fn(&str) -> Option<String>) -> TypeDescriptor {
        match self {
            TypeDescriptor::Object(name) => {
                TypeDescriptor::Object(f(name).unwrap_or_else(|| name.clone()))
            }
            TypeDescriptor::Array(inner) => TypeDescriptor::Array(Box::new(inner.remap(f))),
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Byte => write!(f, "B"),
            TypeDescriptor::Char => write!(f, "C"),
            TypeDescriptor::Double => write!(f, "D"),
            TypeDescriptor::Float => write!(f, "F"),
            TypeDescriptor::Int => write!(f, "I"),
            TypeDescriptor::Long => write!(f, "J"),
            TypeDescriptor::Short => write!(f, "S"),
            TypeDescriptor::Boolean => write!(f, "Z"),
            TypeDescriptor::Void => write!(f, "V"),
            TypeDescriptor::Object(name) => write!(f, "L{name};"),
            TypeDescriptor::Array(inner) => write!(f, "[{inner}"),
        }
    }
}

/// A method descriptor, e.g. `(ILjava/lang/String;)V`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub args: Vec<TypeDescriptor>,
    pub ret: TypeDescriptor,
}

impl MethodDescriptor {
    pub fn parse(desc: &str) -> Option<MethodDescriptor> {
        if !desc.starts_with('(') {
            return None;
        }

        let close = desc.find(')')?;
        let mut args = Vec::new();
        let mut pos = 1;
        while pos < close {
            let (ty, next) = TypeDescriptor::parse_at(desc, pos)?;
            args.push(ty);
            pos = next;
        }

        if pos != close {
            return None;
        }

        match TypeDescriptor::parse_at(desc, close + 1)? {
            (ret, next) if next == desc.len() => Some(MethodDescriptor { args, ret }),
            _ => None,
        }
    }

    /// Local-variable slot index of each declared parameter, accounting for
    /// the implicit receiver and for wide types.
    pub fn parameter_slots(&self, is_static: bool) -> Vec<u16> {
        let mut slots = Vec::with_capacity(self.args.len());
        let mut next = if is_static { 0 } else { 1 };
        for arg in &self.args {
            slots.push(next);
            next += arg.size();
        }

        slots
    }

    /// Rewrite every class name in the descriptor through `f`.
    pub fn remap(&self, f: &impl Fn(&str) -> Option<String>) -> MethodDescriptor {
        MethodDescriptor {
            args: self.args.iter().map(|a| a.remap(f)).collect(),
            ret: self.ret.remap(f),
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for arg in &self.args {
            write!(f, "{arg}")?;
        }
        write!(f, "){}", self.ret)
    }
}

/// A generic signature, carried verbatim.
///
/// Signatures are consumed only by translation collaborators as opaque
/// remappable strings; nothing in the index resolves against them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn new(value: impl Into<String>) -> Self {
        Signature(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
