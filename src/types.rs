use crate::attribute_info::AttributeInfo;
use crate::constant_info::{
    self, ClassConstant, ConstantInfo, FieldRefConstant, MethodRefConstant, NameAndTypeConstant,
    Utf8Constant,
};
use crate::field_info::FieldInfo;
use crate::method_info::MethodInfo;

use binrw::binrw;

#[derive(Clone, Debug)]
#[binrw]
#[brw(big, magic = b"\xca\xfe\xba\xbe")]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub const_pool_size: u16,
    #[br(parse_with = constant_info::parse_constant_pool, args(const_pool_size))]
    #[bw(write_with = constant_info::write_constant_pool)]
    pub const_pool: Vec<ConstantInfo>,
    pub access_flags: ClassAccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces_count: u16,
    #[br(count = interfaces_count)]
    pub interfaces: Vec<u16>,
    pub fields_count: u16,
    #[br(count = fields_count)]
    pub fields: Vec<FieldInfo>,
    pub methods_count: u16,
    #[br(count = methods_count)]
    pub methods: Vec<MethodInfo>,
    pub attributes_count: u16,
    #[br(count = attributes_count)]
    pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
    // -- Constant pool access --

    /// Get a pool entry by 1-based index.
    pub fn constant(&self, index: u16) -> Option<&ConstantInfo> {
        self.const_pool.get((index as usize).checked_sub(1)?)
    }

    pub fn utf8(&self, index: u16) -> Option<&str> {
        constant_info::get_utf8(&self.const_pool, index)
    }

    pub fn class_name(&self, class_index: u16) -> Option<&str> {
        constant_info::get_class_name(&self.const_pool, class_index)
    }

    /// The internal name of this class.
    pub fn this_class_name(&self) -> Option<&str> {
        self.class_name(self.this_class)
    }

    /// The internal name of the superclass, `None` for `java/lang/Object`.
    pub fn super_class_name(&self) -> Option<&str> {
        if self.super_class == 0 {
            return None;
        }

        self.class_name(self.super_class)
    }

    /// Internal names of all directly implemented interfaces.
    pub fn interface_names(&self) -> Vec<&str> {
        self.interfaces
            .iter()
            .filter_map(|&i| self.class_name(i))
            .collect()
    }

    // -- Constant pool building --
    //
    // Used by the indexing tests to assemble class files in memory; indices
    // returned are 1-based.

    pub fn find_utf8_index(&self, value: &str) -> Option<u16> {
        self.const_pool.iter().position(|c| match c {
            ConstantInfo::Utf8(u) => u.as_str() == Some(value),
            _ => false,
        }).map(|pos| pos as u16 + 1)
    }

    pub fn add_utf8(&mut self, value: &str) -> u16 {
        if let Some(existing) = self.find_utf8_index(value) {
            return existing;
        }

        self.push_constant(ConstantInfo::Utf8(Utf8Constant::from_str(value)))
    }

    pub fn add_class(&mut self, name: &str) -> u16 {
        let name_index = self.add_utf8(name);
        let existing = self.const_pool.iter().position(|c| {
            matches!(c, ConstantInfo::Class(cc) if cc.name_index == name_index)
        });
        if let Some(pos) = existing {
            return pos as u16 + 1;
        }

        self.push_constant(ConstantInfo::Class(ClassConstant { name_index }))
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.add_utf8(name);
        let descriptor_index = self.add_utf8(descriptor);
        self.push_constant(ConstantInfo::NameAndType(NameAndTypeConstant {
            name_index,
            descriptor_index,
        }))
    }

    pub fn add_field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.add_class(class);
        let name_and_type_index = self.add_name_and_type(name, descriptor);
        self.push_constant(ConstantInfo::FieldRef(FieldRefConstant {
            class_index,
            name_and_type_index,
        }))
    }

    pub fn add_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.add_class(class);
        let name_and_type_index = self.add_name_and_type(name, descriptor);
        self.push_constant(ConstantInfo::MethodRef(MethodRefConstant {
            class_index,
            name_and_type_index,
        }))
    }

    fn push_constant(&mut self, constant: ConstantInfo) -> u16 {
        let wide = constant.is_wide();
        self.const_pool.push(constant);
        if wide {
            self.const_pool.push(ConstantInfo::Unusable);
        }

        self.const_pool.len() as u16
    }

    /// Recompute all length-prefix fields from the backing vectors.
    /// Must be called before writing a hand-assembled class file.
    pub fn sync_counts(&mut self) {
        self.const_pool_size = self.const_pool.len() as u16 + 1;
        self.interfaces_count = self.interfaces.len() as u16;
        self.fields_count = self.fields.len() as u16;
        self.methods_count = self.methods.len() as u16;
        self.attributes_count = self.attributes.len() as u16;
        for field in &mut self.fields {
            field.attributes_count = field.attributes.len() as u16;
        }

        for method in &mut self.methods {
            method.attributes_count = method.attributes.len() as u16;
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[binrw]
pub struct ClassAccessFlags(u16);

bitflags! {
    impl ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;     //	Declared public; may be accessed from outside its package.
        const FINAL = 0x0010;      //	Declared final; no subclasses allowed.
        const SUPER = 0x0020;      //	Treat superclass methods specially when invoked by the invokespecial instruction.
        const INTERFACE = 0x0200;  //	Is an interface, not a class.
        const ABSTRACT = 0x0400;   //	Declared abstract; must not be instantiated.
        const SYNTHETIC = 0x1000;  //	Declared synthetic; not present in the source code.
        const ANNOTATION = 0x2000; //	Declared as an annotation type.
        const ENUM = 0x4000;       //	Declared as an enum type.
        const MODULE = 0x8000;     //	Declared as a module type.
    }
}
