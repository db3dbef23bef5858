use binrw::binrw;

/// A single constant pool slot.
///
/// `Unusable` fills the phantom second slot that follows every `Long` and
/// `Double` constant, so that pool indices can be used directly.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantInfo {
    Utf8(Utf8Constant),
    Integer(IntegerConstant),
    Float(FloatConstant),
    Long(LongConstant),
    Double(DoubleConstant),
    Class(ClassConstant),
    String(StringConstant),
    FieldRef(FieldRefConstant),
    MethodRef(MethodRefConstant),
    InterfaceMethodRef(InterfaceMethodRefConstant),
    NameAndType(NameAndTypeConstant),
    MethodHandle(MethodHandleConstant),
    MethodType(MethodTypeConstant),
    Dynamic(DynamicConstant),
    InvokeDynamic(InvokeDynamicConstant),
    Module(ModuleConstant),
    Package(PackageConstant),
    Unusable,
}

impl ConstantInfo {
    /// The tag byte this entry is written with, or `None` for `Unusable`.
    pub fn tag(&self) -> Option<u8> {
        match self {
            ConstantInfo::Utf8(_) => Some(1),
            ConstantInfo::Integer(_) => Some(3),
            ConstantInfo::Float(_) => Some(4),
            ConstantInfo::Long(_) => Some(5),
            ConstantInfo::Double(_) => Some(6),
            ConstantInfo::Class(_) => Some(7),
            ConstantInfo::String(_) => Some(8),
            ConstantInfo::FieldRef(_) => Some(9),
            ConstantInfo::MethodRef(_) => Some(10),
            ConstantInfo::InterfaceMethodRef(_) => Some(11),
            ConstantInfo::NameAndType(_) => Some(12),
            ConstantInfo::MethodHandle(_) => Some(15),
            ConstantInfo::MethodType(_) => Some(16),
            ConstantInfo::Dynamic(_) => Some(17),
            ConstantInfo::InvokeDynamic(_) => Some(18),
            ConstantInfo::Module(_) => Some(19),
            ConstantInfo::Package(_) => Some(20),
            ConstantInfo::Unusable => None,
        }
    }

    /// Whether this constant occupies two pool slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, ConstantInfo::Long(_) | ConstantInfo::Double(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct Utf8Constant {
    pub length: u16,
    #[br(count = length)]
    pub bytes: Vec<u8>,
}

impl Utf8Constant {
    pub fn from_str(value: &str) -> Self {
        // Obfuscated symbol names are plain ASCII in practice; standard UTF-8
        // and the JVM's modified UTF-8 agree on everything below the
        // supplementary planes, which is all we ever write.
        Utf8Constant {
            length: value.len() as u16,
            bytes: value.as_bytes().to_vec(),
        }
    }

    /// The decoded string, or `None` if the bytes are not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct IntegerConstant {
    pub value: i32,
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct FloatConstant {
    pub value: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct LongConstant {
    pub value: i64,
}

#[derive(Clone, Debug, PartialEq)]
#[binrw]
#[brw(big)]
pub struct DoubleConstant {
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct ClassConstant {
    pub name_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct StringConstant {
    pub string_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct FieldRefConstant {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct MethodRefConstant {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct InterfaceMethodRefConstant {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct NameAndTypeConstant {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct MethodHandleConstant {
    pub reference_kind: u8,
    pub reference_index: u16,
}

impl MethodHandleConstant {
    pub const GET_FIELD: u8 = 1;
    pub const GET_STATIC: u8 = 2;
    pub const PUT_FIELD: u8 = 3;
    pub const PUT_STATIC: u8 = 4;
    pub const INVOKE_VIRTUAL: u8 = 5;
    pub const INVOKE_STATIC: u8 = 6;
    pub const INVOKE_SPECIAL: u8 = 7;
    pub const NEW_INVOKE_SPECIAL: u8 = 8;
    pub const INVOKE_INTERFACE: u8 = 9;

    /// Whether the handle points at a field rather than a method.
    pub fn is_field_handle(&self) -> bool {
        (Self::GET_FIELD..=Self::PUT_STATIC).contains(&self.reference_kind)
    }

    /// Whether invoking the handle needs no receiver.
    pub fn is_static_handle(&self) -> bool {
        matches!(
            self.reference_kind,
            Self::GET_STATIC | Self::PUT_STATIC | Self::INVOKE_STATIC
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct MethodTypeConstant {
    pub descriptor_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct DynamicConstant {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct InvokeDynamicConstant {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct ModuleConstant {
    pub name_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[binrw]
#[brw(big)]
pub struct PackageConstant {
    pub name_index: u16,
}
