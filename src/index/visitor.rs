//! Extracts declarations and references from parsed class files.
//!
//! Pass 1 ([`index_declarations`]) registers classes, members and parameter
//! locals. Pass 2 ([`index_references`]) decodes every method body and
//! records use-sites with their target-kind classification; it requires
//! pass 1 to have completed for the whole jar, because references must
//! land on already-known declarations.

use std::sync::Arc;

use crate::attribute_info::{
    decode_attribute, find_attribute, AttributeInfo, BootstrapMethodsAttribute, CodeAttribute,
    EnclosingMethodAttribute, LocalVariableTableAttribute, MethodParametersAttribute,
    SignatureAttribute, BOOTSTRAP_METHODS, CODE, ENCLOSING_METHOD, LOCAL_VARIABLE_TABLE,
    METHOD_PARAMETERS, RECORD, SIGNATURE,
};
use crate::code_attribute::{parse_instructions, Instruction};
use crate::constant_info::{
    get_invoke_dynamic, get_method_type, get_name_and_type, get_utf8, resolve_ref, ConstantInfo,
    MethodHandleConstant,
};
use crate::descriptor::{MethodDescriptor, Signature, TypeDescriptor};
use crate::entry::{AccessFlags, ClassEntry, Entry, MethodEntry};
use crate::method_info::MethodInfo;
use crate::ClassFile;

use super::enclosing_index::EnclosingMethodData;
use super::entry_index::{ClassDefinition, MemberDefinition};
use super::jar_index::JarIndex;
use super::reference_index::ReferenceTargetType;
use super::{IndexError, IndexResult};

fn malformed(class: &str, detail: impl Into<String>) -> IndexError {
    IndexError::MalformedClass {
        class: class.to_string(),
        detail: detail.into(),
    }
}

// ---------------------------------------------------------------------------
// Pass 1: declarations
// ---------------------------------------------------------------------------

/// Index every declaration in one class. Returns `false` when the class
/// belongs to a library namespace and was skipped.
pub(crate) fn index_declarations(index: &mut JarIndex, class_file: &ClassFile) -> IndexResult<bool> {
    let pool = &class_file.const_pool;
    let class_name = class_file
        .this_class_name()
        .ok_or_else(|| malformed("<unknown>", "missing or invalid this_class"))?;

    let class = index.entry_index.get_class(class_name);
    if class.is_library() {
        return Ok(false);
    }

    let super_class = class_file
        .super_class_name()
        .map(|name| index.entry_index.get_class(name));

    let mut interfaces = Vec::new();
    for interface_name in class_file.interface_names() {
        if interface_name == class_name {
            return Err(IndexError::SelfInterface(class_name.to_string()));
        }
        interfaces.push(index.entry_index.get_class(interface_name));
    }

    let mut class_access = AccessFlags::from_raw(class_file.access_flags.bits());
    if find_attribute(&class_file.attributes, pool, RECORD).is_some() {
        class_access = class_access.with_record();
    }

    let definition = ClassDefinition {
        access: class_access,
        signature: attribute_signature(&class_file.attributes, pool, class_name)?,
        super_class,
        interfaces,
    };
    index.inheritance_index.index_class(&class, &definition);
    index.entry_index.index_class(&class, definition);

    if let Some(outer) = class.outer_class().cloned() {
        if !class_access.is_synthetic() {
            index
                .children_by_class
                .entry(outer)
                .or_default()
                .push(Entry::Class(class.clone()));
        }
    }

    index_enclosing_method(index, class_file, &class, class_name)?;

    for field_info in &class_file.fields {
        let name = class_file
            .utf8(field_info.name_index)
            .ok_or_else(|| malformed(class_name, "field name is not utf8"))?;
        let desc_str = class_file
            .utf8(field_info.descriptor_index)
            .ok_or_else(|| malformed(class_name, "field descriptor is not utf8"))?;
        let desc = TypeDescriptor::parse(desc_str)
            .ok_or_else(|| malformed(class_name, format!("bad field descriptor {desc_str}")))?;

        let field = index.entry_index.get_field(&class, name, &desc);
        let access = AccessFlags::from_raw(field_info.access_flags.bits());

        index.reference_index.index_field(&index.entry_index, &field);
        let definition = MemberDefinition {
            access,
            signature: attribute_signature(&field_info.attributes, pool, class_name)?,
        };
        index.entry_index.index_field(&field, definition);

        if !access.is_synthetic() {
            index
                .children_by_class
                .entry(class.clone())
                .or_default()
                .push(Entry::Field(field));
        }
    }

    for method_info in &class_file.methods {
        let name = class_file
            .utf8(method_info.name_index)
            .ok_or_else(|| malformed(class_name, "method name is not utf8"))?;
        let desc_str = class_file
            .utf8(method_info.descriptor_index)
            .ok_or_else(|| malformed(class_name, "method descriptor is not utf8"))?;
        let desc = MethodDescriptor::parse(desc_str)
            .ok_or_else(|| malformed(class_name, format!("bad method descriptor {desc_str}")))?;

        let method = index.entry_index.get_method(&class, name, &desc);
        let access = AccessFlags::from_raw(method_info.access_flags.bits());

        index.reference_index.index_method(&index.entry_index, &method);
        let definition = MemberDefinition {
            access,
            signature: attribute_signature(&method_info.attributes, pool, class_name)?,
        };
        index.entry_index.index_method(&method, definition);

        if !access.is_synthetic() && method.obf_name() != "<clinit>" {
            index
                .children_by_class
                .entry(class.clone())
                .or_default()
                .push(Entry::Method(method.clone()));
        }

        index_parameters(index, class_file, method_info, &method, access);
    }

    Ok(true)
}

fn index_enclosing_method(
    index: &mut JarIndex,
    class_file: &ClassFile,
    class: &Arc<ClassEntry>,
    class_name: &str,
) -> IndexResult<()> {
    let pool = &class_file.const_pool;
    let attribute = match decode_attribute::<EnclosingMethodAttribute>(
        &class_file.attributes,
        pool,
        ENCLOSING_METHOD,
    ) {
        None => return Ok(()),
        Some(Err(e)) => {
            return Err(malformed(class_name, format!("bad EnclosingMethod attribute: {e}")))
        }
        Some(Ok(attribute)) => attribute,
    };

    let owner_name = class_file
        .class_name(attribute.class_index)
        .ok_or_else(|| malformed(class_name, "EnclosingMethod owner is not a class constant"))?;
    let owner = index.entry_index.get_class(owner_name);

    let method = if attribute.method_index == 0 {
        None
    } else {
        let (name, desc_str) = get_name_and_type(pool, attribute.method_index)
            .ok_or_else(|| malformed(class_name, "EnclosingMethod method is not a NameAndType"))?;
        let desc = MethodDescriptor::parse(desc_str)
            .ok_or_else(|| malformed(class_name, format!("bad method descriptor {desc_str}")))?;
        Some(index.entry_index.get_method(&owner, name, &desc))
    };

    index
        .enclosing_method_index
        .index_enclosing_method(class, EnclosingMethodData { owner, method });
    Ok(())
}

/// Register parameter locals, naming them from `MethodParameters` when the
/// class was compiled with `-parameters`, falling back to debug names from
/// the `LocalVariableTable`. Missing names are interned empty; a later
/// rename gives them their only usable name.
fn index_parameters(
    index: &mut JarIndex,
    class_file: &ClassFile,
    method_info: &MethodInfo,
    method: &Arc<MethodEntry>,
    access: AccessFlags,
) {
    if method.desc().args.is_empty() {
        return;
    }

    let pool = &class_file.const_pool;
    let slots = method.desc().parameter_slots(access.is_static());
    let mut names: Vec<Option<String>> = vec![None; slots.len()];

    if let Some(Ok(attribute)) = decode_attribute::<MethodParametersAttribute>(
        &method_info.attributes,
        pool,
        METHOD_PARAMETERS,
    ) {
        for (position, parameter) in attribute.parameters.iter().enumerate().take(names.len()) {
            if parameter.name_index != 0 {
                names[position] = get_utf8(pool, parameter.name_index).map(str::to_string);
            }
        }
    }

    if names.iter().any(Option::is_none) {
        if let Some(Ok(code)) =
            decode_attribute::<CodeAttribute>(&method_info.attributes, pool, CODE)
        {
            if let Some(Ok(table)) = decode_attribute::<LocalVariableTableAttribute>(
                &code.attributes,
                pool,
                LOCAL_VARIABLE_TABLE,
            ) {
                for (position, slot) in slots.iter().enumerate() {
                    if names[position].is_some() {
                        continue;
                    }
                    names[position] = table
                        .items
                        .iter()
                        .find(|item| item.index == *slot && item.start_pc == 0)
                        .and_then(|item| get_utf8(pool, item.name_index))
                        .map(str::to_string);
                }
            }
        }
    }

    for (position, slot) in slots.iter().enumerate() {
        let name = names[position].clone().unwrap_or_default();
        let local = index
            .entry_index
            .get_local_variable(method, *slot, &name, true);
        index
            .entry_index
            .index_local_variable(&local, method.desc().args[position].clone());
    }
}

fn attribute_signature(
    attributes: &[AttributeInfo],
    pool: &[ConstantInfo],
    class_name: &str,
) -> IndexResult<Option<Signature>> {
    match decode_attribute::<SignatureAttribute>(attributes, pool, SIGNATURE) {
        None => Ok(None),
        Some(Err(e)) => Err(malformed(class_name, format!("bad Signature attribute: {e}"))),
        Some(Ok(attribute)) => {
            let text = get_utf8(pool, attribute.signature_index)
                .ok_or_else(|| malformed(class_name, "Signature points at non-utf8"))?;
            Ok(Some(Signature::new(text)))
        }
    }
}

// ---------------------------------------------------------------------------
// Pass 2: references
// ---------------------------------------------------------------------------

pub(crate) fn index_references(index: &mut JarIndex, class_file: &ClassFile) -> IndexResult<()> {
    let pool = &class_file.const_pool;
    let class_name = class_file
        .this_class_name()
        .ok_or_else(|| malformed("<unknown>", "missing or invalid this_class"))?;

    let class = index.entry_index.get_class(class_name);
    if class.is_library() {
        return Ok(());
    }

    let bootstrap_methods = match decode_attribute::<BootstrapMethodsAttribute>(
        &class_file.attributes,
        pool,
        BOOTSTRAP_METHODS,
    ) {
        None => None,
        Some(Err(e)) => {
            return Err(malformed(class_name, format!("bad BootstrapMethods attribute: {e}")))
        }
        Some(Ok(attribute)) => Some(attribute),
    };

    // The direct superclass classifies this()/super() constructor calls.
    let direct_super = index
        .entry_index
        .definition(&class)
        .and_then(|definition| definition.super_class.clone());

    for method_info in &class_file.methods {
        let name = class_file
            .utf8(method_info.name_index)
            .ok_or_else(|| malformed(class_name, "method name is not utf8"))?;
        let desc_str = class_file
            .utf8(method_info.descriptor_index)
            .ok_or_else(|| malformed(class_name, "method descriptor is not utf8"))?;
        let desc = MethodDescriptor::parse(desc_str)
            .ok_or_else(|| malformed(class_name, format!("bad method descriptor {desc_str}")))?;
        let caller = index.entry_index.get_method(&class, name, &desc);

        let code = match decode_attribute::<CodeAttribute>(&method_info.attributes, pool, CODE) {
            None => continue,
            Some(Err(e)) => {
                return Err(malformed(class_name, format!("bad Code attribute: {e}")))
            }
            Some(Ok(code)) => code,
        };

        let instructions =
            parse_instructions(&code.code).map_err(|source| IndexError::ClassParse {
                class: class_name.to_string(),
                source,
            })?;

        for (_, instruction) in &instructions {
            match instruction {
                Instruction::Getstatic(i) | Instruction::Putstatic(i) => {
                    index_field_access(index, pool, class_name, &caller, *i, true)?;
                }
                Instruction::Getfield(i) | Instruction::Putfield(i) => {
                    index_field_access(index, pool, class_name, &caller, *i, false)?;
                }
                Instruction::Invokestatic(i) => {
                    index_method_access(index, pool, class_name, &caller, *i, true)?;
                }
                Instruction::Invokevirtual(i) | Instruction::Invokeinterface { index: i, .. } => {
                    index_method_access(index, pool, class_name, &caller, *i, false)?;
                }
                Instruction::Invokespecial(i) => {
                    index_invoke_special(
                        index,
                        pool,
                        class_name,
                        &class,
                        direct_super.as_ref(),
                        &caller,
                        *i,
                    )?;
                }
                Instruction::Invokedynamic { index: i, .. } => {
                    index_invoke_dynamic(
                        index,
                        pool,
                        class_name,
                        &caller,
                        bootstrap_methods.as_ref(),
                        *i,
                    )?;
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn index_field_access(
    index: &mut JarIndex,
    pool: &[ConstantInfo],
    class_name: &str,
    caller: &Arc<MethodEntry>,
    cp_index: u16,
    static_access: bool,
) -> IndexResult<()> {
    let (owner_name, name, desc_str) = resolve_ref(pool, cp_index)
        .ok_or_else(|| malformed(class_name, format!("bad field reference #{cp_index}")))?;
    if owner_name.starts_with('[') {
        return Ok(());
    }

    let desc = TypeDescriptor::parse(desc_str)
        .ok_or_else(|| malformed(class_name, format!("bad field descriptor {desc_str}")))?;
    let owner = index.entry_index.get_class(owner_name);
    let target = index.entry_index.get_field(&owner, name, &desc);

    let target_type = if static_access {
        ReferenceTargetType::Static
    } else {
        ReferenceTargetType::ClassType(owner)
    };
    index
        .reference_index
        .index_field_reference(caller, &target, target_type);
    Ok(())
}

fn index_method_access(
    index: &mut JarIndex,
    pool: &[ConstantInfo],
    class_name: &str,
    caller: &Arc<MethodEntry>,
    cp_index: u16,
    static_access: bool,
) -> IndexResult<()> {
    let (owner_name, name, desc_str) = resolve_ref(pool, cp_index)
        .ok_or_else(|| malformed(class_name, format!("bad method reference #{cp_index}")))?;
    // Array pseudo-methods like `[I.clone()` have no renamable declaration.
    if owner_name.starts_with('[') {
        return Ok(());
    }

    let desc = MethodDescriptor::parse(desc_str)
        .ok_or_else(|| malformed(class_name, format!("bad method descriptor {desc_str}")))?;
    let owner = index.entry_index.get_class(owner_name);
    let target = index.entry_index.get_method(&owner, name, &desc);

    let target_type = if static_access {
        ReferenceTargetType::Static
    } else {
        ReferenceTargetType::ClassType(owner)
    };
    index
        .reference_index
        .index_method_reference(caller, &target, target_type);
    Ok(())
}

fn index_invoke_special(
    index: &mut JarIndex,
    pool: &[ConstantInfo],
    class_name: &str,
    class: &Arc<ClassEntry>,
    direct_super: Option<&Arc<ClassEntry>>,
    caller: &Arc<MethodEntry>,
    cp_index: u16,
) -> IndexResult<()> {
    let (owner_name, name, desc_str) = resolve_ref(pool, cp_index)
        .ok_or_else(|| malformed(class_name, format!("bad method reference #{cp_index}")))?;
    if owner_name.starts_with('[') {
        return Ok(());
    }

    let desc = MethodDescriptor::parse(desc_str)
        .ok_or_else(|| malformed(class_name, format!("bad method descriptor {desc_str}")))?;
    let owner = index.entry_index.get_class(owner_name);
    let target = index.entry_index.get_method(&owner, name, &desc);

    let target_type = if name == "<init>" {
        // this()/super() chains from a constructor act on the object under
        // construction; everything else is a fresh allocation.
        if caller.is_constructor() && (&owner == class || Some(&owner) == direct_super) {
            ReferenceTargetType::UninitializedThis
        } else {
            ReferenceTargetType::Uninitialized
        }
    } else {
        // Private or super-qualified call on `this`.
        ReferenceTargetType::ClassType(owner)
    };
    index
        .reference_index
        .index_method_reference(caller, &target, target_type);
    Ok(())
}

fn index_invoke_dynamic(
    index: &mut JarIndex,
    pool: &[ConstantInfo],
    class_name: &str,
    caller: &Arc<MethodEntry>,
    bootstrap_methods: Option<&BootstrapMethodsAttribute>,
    cp_index: u16,
) -> IndexResult<()> {
    let (bootstrap_index, _, desc_str) = get_invoke_dynamic(pool, cp_index)
        .ok_or_else(|| malformed(class_name, format!("bad invokedynamic reference #{cp_index}")))?;

    // The call-site descriptor mentions captured and produced types.
    if let Some(desc) = MethodDescriptor::parse(desc_str) {
        index
            .reference_index
            .index_method_descriptor(&index.entry_index, caller, &desc);
    }

    let Some(bootstrap_methods) = bootstrap_methods else {
        return Ok(());
    };
    let Some(bootstrap) = bootstrap_methods
        .bootstrap_methods
        .get(bootstrap_index as usize)
    else {
        return Ok(());
    };

    // A lambda's implementation is referenced only through a MethodHandle
    // bootstrap argument; without this, the impl method would look unused.
    for &argument in &bootstrap.bootstrap_arguments {
        match pool.get((argument as usize).wrapping_sub(1)) {
            Some(ConstantInfo::MethodHandle(handle)) => {
                index_method_handle(index, pool, class_name, caller, handle)?;
            }
            Some(ConstantInfo::MethodType(_)) => {
                if let Some(type_desc) = get_method_type(pool, argument) {
                    if let Some(desc) = MethodDescriptor::parse(type_desc) {
                        index
                            .reference_index
                            .index_method_descriptor(&index.entry_index, caller, &desc);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn index_method_handle(
    index: &mut JarIndex,
    pool: &[ConstantInfo],
    class_name: &str,
    caller: &Arc<MethodEntry>,
    handle: &MethodHandleConstant,
) -> IndexResult<()> {
    let Some((owner_name, name, desc_str)) = resolve_ref(pool, handle.reference_index) else {
        return Ok(());
    };
    if owner_name.starts_with('[') {
        return Ok(());
    }

    let owner = index.entry_index.get_class(owner_name);
    if handle.is_field_handle() {
        let desc = TypeDescriptor::parse(desc_str)
            .ok_or_else(|| malformed(class_name, format!("bad field descriptor {desc_str}")))?;
        let target = index.entry_index.get_field(&owner, name, &desc);
        let target_type = if handle.is_static_handle() {
            ReferenceTargetType::Static
        } else {
            ReferenceTargetType::ClassType(owner)
        };
        index
            .reference_index
            .index_field_reference(caller, &target, target_type);
    } else {
        let desc = MethodDescriptor::parse(desc_str)
            .ok_or_else(|| malformed(class_name, format!("bad method descriptor {desc_str}")))?;
        let target = index.entry_index.get_method(&owner, name, &desc);
        let target_type = if handle.is_static_handle() {
            ReferenceTargetType::Static
        } else if handle.reference_kind == MethodHandleConstant::NEW_INVOKE_SPECIAL {
            ReferenceTargetType::Uninitialized
        } else {
            ReferenceTargetType::ClassType(owner)
        };
        index
            .reference_index
            .index_method_reference(caller, &target, target_type);
    }

    Ok(())
}
