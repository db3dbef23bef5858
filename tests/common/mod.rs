#![allow(dead_code)]

//! In-memory class file and jar builders for the indexing tests.

use std::io::Cursor;
use std::sync::Arc;

use jarmap::attribute_info::{AttributeInfo, CodeAttribute, EnclosingMethodAttribute, MethodParametersAttribute, ParameterAttribute};
use jarmap::code_attribute::{assemble_instructions, Instruction};
use jarmap::descriptor::{MethodDescriptor, TypeDescriptor};
use jarmap::entry::{ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};
use jarmap::field_info::{FieldAccessFlags, FieldInfo};
use jarmap::index::JarIndex;
use jarmap::jar_utils::JarFile;
use jarmap::method_info::{MethodAccessFlags, MethodInfo};
use jarmap::progress::NoProgress;
use jarmap::types::ClassAccessFlags;
use jarmap::validation::{SilentNotifier, ValidationContext};
use jarmap::ClassFile;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_PACKAGE: u16 = 0x0000;

pub const OBJECT: &str = "java/lang/Object";

/// Assembles one class file, tracking its constant pool as members and
/// bodies are added. Constant-pool indices for instruction operands must be
/// created before the method body that uses them.
pub struct ClassBuilder {
    name: String,
    class_file: ClassFile,
}

impl ClassBuilder {
    pub fn new(name: &str, access: u16, super_name: &str) -> Self {
        let mut class_file = ClassFile {
            minor_version: 0,
            major_version: 52,
            const_pool_size: 1,
            const_pool: Vec::new(),
            access_flags: ClassAccessFlags::from_bits_retain(access),
            this_class: 0,
            super_class: 0,
            interfaces_count: 0,
            interfaces: Vec::new(),
            fields_count: 0,
            fields: Vec::new(),
            methods_count: 0,
            methods: Vec::new(),
            attributes_count: 0,
            attributes: Vec::new(),
        };
        class_file.this_class = class_file.add_class(name);
        class_file.super_class = class_file.add_class(super_name);

        ClassBuilder {
            name: name.to_string(),
            class_file,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class_file.add_class(name);
        self.class_file.interfaces.push(index);
        self
    }

    // -- Constant pool refs for instruction operands --

    pub fn method_ref(&mut self, class: &str, name: &str, desc: &str) -> u16 {
        self.class_file.add_method_ref(class, name, desc)
    }

    pub fn field_ref(&mut self, class: &str, name: &str, desc: &str) -> u16 {
        self.class_file.add_field_ref(class, name, desc)
    }

    pub fn class_ref(&mut self, name: &str) -> u16 {
        self.class_file.add_class(name)
    }

    // -- Members --

    pub fn field(&mut self, access: u16, name: &str, desc: &str) -> &mut Self {
        let name_index = self.class_file.add_utf8(name);
        let descriptor_index = self.class_file.add_utf8(desc);
        self.class_file.fields.push(FieldInfo {
            access_flags: FieldAccessFlags::from_bits_retain(access),
            name_index,
            descriptor_index,
            attributes_count: 0,
            attributes: Vec::new(),
        });
        self
    }

    /// A concrete method with the given body.
    pub fn method(&mut self, access: u16, name: &str, desc: &str, body: &[Instruction]) -> &mut Self {
        let code = self.code_attr(body);
        self.add_method(access, name, desc, vec![code]);
        self
    }

    /// A method without a body (abstract or interface).
    pub fn abstract_method(&mut self, access: u16, name: &str, desc: &str) -> &mut Self {
        self.add_method(access, name, desc, Vec::new());
        self
    }

    /// A concrete method whose parameters carry `MethodParameters` names.
    pub fn method_with_params(
        &mut self,
        access: u16,
        name: &str,
        desc: &str,
        params: &[&str],
        body: &[Instruction],
    ) -> &mut Self {
        let code = self.code_attr(body);
        let parameters = self.method_params_attr(params);
        self.add_method(access, name, desc, vec![code, parameters]);
        self
    }

    pub fn add_method(&mut self, access: u16, name: &str, desc: &str, attributes: Vec<AttributeInfo>) {
        let name_index = self.class_file.add_utf8(name);
        let descriptor_index = self.class_file.add_utf8(desc);
        self.class_file.methods.push(MethodInfo {
            access_flags: MethodAccessFlags::from_bits_retain(access),
            name_index,
            descriptor_index,
            attributes_count: attributes.len() as u16,
            attributes,
        });
    }

    // -- Attributes --

    pub fn code_attr(&mut self, body: &[Instruction]) -> AttributeInfo {
        let code = assemble_instructions(body).unwrap();
        let payload = CodeAttribute {
            max_stack: 8,
            max_locals: 8,
            code_length: code.len() as u32,
            code,
            exception_table_length: 0,
            exception_table: Vec::new(),
            attributes_count: 0,
            attributes: Vec::new(),
        };
        let name_index = self.class_file.add_utf8("Code");
        AttributeInfo::encode(name_index, &payload).unwrap()
    }

    pub fn method_params_attr(&mut self, params: &[&str]) -> AttributeInfo {
        let parameters: Vec<ParameterAttribute> = params
            .iter()
            .map(|param| ParameterAttribute {
                name_index: self.class_file.add_utf8(param),
                access_flags: 0,
            })
            .collect();
        let payload = MethodParametersAttribute {
            parameters_count: parameters.len() as u8,
            parameters,
        };
        let name_index = self.class_file.add_utf8("MethodParameters");
        AttributeInfo::encode(name_index, &payload).unwrap()
    }

    /// Mark this class as enclosed by a method of `owner`.
    pub fn enclosing_method(&mut self, owner: &str, method: Option<(&str, &str)>) -> &mut Self {
        let class_index = self.class_file.add_class(owner);
        let method_index = match method {
            Some((name, desc)) => self.class_file.add_name_and_type(name, desc),
            None => 0,
        };
        let payload = EnclosingMethodAttribute {
            class_index,
            method_index,
        };
        let name_index = self.class_file.add_utf8("EnclosingMethod");
        let attribute = AttributeInfo::encode(name_index, &payload).unwrap();
        self.class_file.attributes.push(attribute);
        self
    }

    // -- Assembly --

    pub fn build(mut self) -> Vec<u8> {
        self.class_file.sync_counts();
        let mut buf = Cursor::new(Vec::new());
        use binrw::BinWrite;
        self.class_file.write(&mut buf).unwrap();
        buf.into_inner()
    }
}

/// Build a jar from the given classes and index it.
pub fn index_classes(classes: Vec<ClassBuilder>) -> JarIndex {
    let mut jar = JarFile::new();
    for class in classes {
        let name = class.name().to_string();
        jar.set_entry(format!("{name}.class"), class.build());
    }

    let mut index = JarIndex::new();
    index.index_jar(&jar, &mut NoProgress).unwrap();
    index
}

/// Build a jar from the given classes without indexing it.
pub fn build_jar(classes: Vec<ClassBuilder>) -> JarFile {
    let mut jar = JarFile::new();
    for class in classes {
        let name = class.name().to_string();
        jar.set_entry(format!("{name}.class"), class.build());
    }

    jar
}

// -- Entry lookups --

pub fn class_entry(index: &JarIndex, name: &str) -> Arc<ClassEntry> {
    index.entry_index().get_class(name)
}

pub fn field_entry(index: &JarIndex, class: &str, name: &str, desc: &str) -> Arc<FieldEntry> {
    let class = class_entry(index, class);
    index
        .entry_index()
        .get_field(&class, name, &TypeDescriptor::parse(desc).unwrap())
}

pub fn method_entry(index: &JarIndex, class: &str, name: &str, desc: &str) -> Arc<MethodEntry> {
    let class = class_entry(index, class);
    index
        .entry_index()
        .get_method(&class, name, &MethodDescriptor::parse(desc).unwrap())
}

pub fn local_entry(
    index: &JarIndex,
    class: &str,
    method: &str,
    desc: &str,
    slot: u16,
) -> Arc<LocalVariableEntry> {
    let method = method_entry(index, class, method, desc);
    index.entry_index().get_local_variable(&method, slot, "", true)
}

pub fn entry_of_method(index: &JarIndex, class: &str, name: &str, desc: &str) -> Entry {
    Entry::Method(method_entry(index, class, name, desc))
}

pub fn entry_of_field(index: &JarIndex, class: &str, name: &str, desc: &str) -> Entry {
    Entry::Field(field_entry(index, class, name, desc))
}

/// Run `f` with a fresh validation context and return the raised messages.
pub fn with_vc<T>(f: impl FnOnce(&mut ValidationContext<'_>) -> T) -> (T, Vec<jarmap::validation::Message>) {
    let notifier = SilentNotifier;
    let mut vc = ValidationContext::new(&notifier);
    let result = f(&mut vc);
    let messages = vc.messages().iter().map(|m| m.message).collect();
    (result, messages)
}
