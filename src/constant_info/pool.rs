use std::io::{Seek, Write};

use binrw::{BinRead, BinResult, BinWrite};

use super::types::*;

// ---------------------------------------------------------------------------
// Parsing / writing
// ---------------------------------------------------------------------------

/// Read `count - 1` logical constant pool entries, inserting an `Unusable`
/// filler after every `Long`/`Double` so that vec position `i - 1` is pool
/// index `i`.
#[binrw::parser(reader, endian)]
pub fn parse_constant_pool(count: u16) -> BinResult<Vec<ConstantInfo>> {
    let mut pool = Vec::with_capacity(count.saturating_sub(1) as usize);

    while (pool.len() as u16) + 1 < count {
        let pos = reader.stream_position()?;
        let tag = u8::read_options(reader, endian, ())?;
        let entry = match tag {
            1 => ConstantInfo::Utf8(Utf8Constant::read_options(reader, endian, ())?),
            3 => ConstantInfo::Integer(IntegerConstant::read_options(reader, endian, ())?),
            4 => ConstantInfo::Float(FloatConstant::read_options(reader, endian, ())?),
            5 => ConstantInfo::Long(LongConstant::read_options(reader, endian, ())?),
            6 => ConstantInfo::Double(DoubleConstant::read_options(reader, endian, ())?),
            7 => ConstantInfo::Class(ClassConstant::read_options(reader, endian, ())?),
            8 => ConstantInfo::String(StringConstant::read_options(reader, endian, ())?),
            9 => ConstantInfo::FieldRef(FieldRefConstant::read_options(reader, endian, ())?),
            10 => ConstantInfo::MethodRef(MethodRefConstant::read_options(reader, endian, ())?),
            11 => ConstantInfo::InterfaceMethodRef(InterfaceMethodRefConstant::read_options(
                reader, endian, (),
            )?),
            12 => ConstantInfo::NameAndType(NameAndTypeConstant::read_options(reader, endian, ())?),
            15 => ConstantInfo::MethodHandle(MethodHandleConstant::read_options(reader, endian, ())?),
            16 => ConstantInfo::MethodType(MethodTypeConstant::read_options(reader, endian, ())?),
            17 => ConstantInfo::Dynamic(DynamicConstant::read_options(reader, endian, ())?),
            18 => ConstantInfo::InvokeDynamic(InvokeDynamicConstant::read_options(
                reader, endian, (),
            )?),
            19 => ConstantInfo::Module(ModuleConstant::read_options(reader, endian, ())?),
            20 => ConstantInfo::Package(PackageConstant::read_options(reader, endian, ())?),
            other => {
                return Err(binrw::Error::AssertFail {
                    pos,
                    message: format!("unknown constant pool tag {other}"),
                })
            }
        };

        let wide = entry.is_wide();
        pool.push(entry);
        if wide {
            pool.push(ConstantInfo::Unusable);
        }
    }

    Ok(pool)
}

/// Write the pool back out, skipping `Unusable` filler slots.
#[binrw::writer(writer, endian)]
pub fn write_constant_pool(pool: &Vec<ConstantInfo>) -> BinResult<()> {
    for entry in pool {
        let Some(tag) = entry.tag() else { continue };
        tag.write_options(writer, endian, ())?;
        write_constant(entry, writer, endian)?;
    }

    Ok(())
}

fn write_constant<W: Write + Seek>(
    entry: &ConstantInfo,
    writer: &mut W,
    endian: binrw::Endian,
) -> BinResult<()> {
    match entry {
        ConstantInfo::Utf8(c) => c.write_options(writer, endian, ()),
        ConstantInfo::Integer(c) => c.write_options(writer, endian, ()),
        ConstantInfo::Float(c) => c.write_options(writer, endian, ()),
        ConstantInfo::Long(c) => c.write_options(writer, endian, ()),
        ConstantInfo::Double(c) => c.write_options(writer, endian, ()),
        ConstantInfo::Class(c) => c.write_options(writer, endian, ()),
        ConstantInfo::String(c) => c.write_options(writer, endian, ()),
        ConstantInfo::FieldRef(c) => c.write_options(writer, endian, ()),
        ConstantInfo::MethodRef(c) => c.write_options(writer, endian, ()),
        ConstantInfo::InterfaceMethodRef(c) => c.write_options(writer, endian, ()),
        ConstantInfo::NameAndType(c) => c.write_options(writer, endian, ()),
        ConstantInfo::MethodHandle(c) => c.write_options(writer, endian, ()),
        ConstantInfo::MethodType(c) => c.write_options(writer, endian, ()),
        ConstantInfo::Dynamic(c) => c.write_options(writer, endian, ()),
        ConstantInfo::InvokeDynamic(c) => c.write_options(writer, endian, ()),
        ConstantInfo::Module(c) => c.write_options(writer, endian, ()),
        ConstantInfo::Package(c) => c.write_options(writer, endian, ()),
        ConstantInfo::Unusable => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Accessors (1-based pool indices)
// ---------------------------------------------------------------------------

/// Look up a UTF-8 constant by 1-based index.
pub fn get_utf8(pool: &[ConstantInfo], index: u16) -> Option<&str> {
    match pool.get((index as usize).checked_sub(1)?)? {
        ConstantInfo::Utf8(u) => u.as_str(),
        _ => None,
    }
}

/// Resolve a Class constant to its internal name.
pub fn get_class_name(pool: &[ConstantInfo], class_index: u16) -> Option<&str> {
    match pool.get((class_index as usize).checked_sub(1)?)? {
        ConstantInfo::Class(c) => get_utf8(pool, c.name_index),
        _ => None,
    }
}

/// Resolve a NameAndType constant to `(name, descriptor)`.
pub fn get_name_and_type(pool: &[ConstantInfo], nat_index: u16) -> Option<(&str, &str)> {
    match pool.get((nat_index as usize).checked_sub(1)?)? {
        ConstantInfo::NameAndType(nat) => {
            let name = get_utf8(pool, nat.name_index)?;
            let desc = get_utf8(pool, nat.descriptor_index)?;
            Some((name, desc))
        }
        _ => None,
    }
}

/// Resolve a FieldRef, MethodRef, or InterfaceMethodRef to
/// `(class_name, member_name, descriptor)`.
pub fn resolve_ref(pool: &[ConstantInfo], index: u16) -> Option<(&str, &str, &str)> {
    let entry = pool.get((index as usize).checked_sub(1)?)?;
    let (class_index, nat_index) = match entry {
        ConstantInfo::FieldRef(r) => (r.class_index, r.name_and_type_index),
        ConstantInfo::MethodRef(r) => (r.class_index, r.name_and_type_index),
        ConstantInfo::InterfaceMethodRef(r) => (r.class_index, r.name_and_type_index),
        _ => return None,
    };
    let class_name = get_class_name(pool, class_index)?;
    let (name, desc) = get_name_and_type(pool, nat_index)?;
    Some((class_name, name, desc))
}

/// Get a MethodHandle constant by 1-based index.
pub fn get_method_handle(pool: &[ConstantInfo], index: u16) -> Option<&MethodHandleConstant> {
    match pool.get((index as usize).checked_sub(1)?)? {
        ConstantInfo::MethodHandle(h) => Some(h),
        _ => None,
    }
}

/// Resolve a MethodType constant to its descriptor string.
pub fn get_method_type(pool: &[ConstantInfo], index: u16) -> Option<&str> {
    match pool.get((index as usize).checked_sub(1)?)? {
        ConstantInfo::MethodType(t) => get_utf8(pool, t.descriptor_index),
        _ => None,
    }
}

/// Resolve an InvokeDynamic constant to `(bootstrap_index, name, descriptor)`.
pub fn get_invoke_dynamic(pool: &[ConstantInfo], index: u16) -> Option<(u16, &str, &str)> {
    match pool.get((index as usize).checked_sub(1)?)? {
        ConstantInfo::InvokeDynamic(d) => {
            let (name, desc) = get_name_and_type(pool, d.name_and_type_index)?;
            Some((d.bootstrap_method_attr_index, name, desc))
        }
        _ => None,
    }
}
