use std::io::Cursor;

use binrw::{BinRead, BinResult, BinWrite};

use crate::constant_info::ConstantInfo;

use super::types::*;

pub const CODE: &str = "Code";
pub const ENCLOSING_METHOD: &str = "EnclosingMethod";
pub const SIGNATURE: &str = "Signature";
pub const INNER_CLASSES: &str = "InnerClasses";
pub const LOCAL_VARIABLE_TABLE: &str = "LocalVariableTable";
pub const METHOD_PARAMETERS: &str = "MethodParameters";
pub const BOOTSTRAP_METHODS: &str = "BootstrapMethods";
pub const EXCEPTIONS: &str = "Exceptions";
pub const SOURCE_FILE: &str = "SourceFile";
pub const RECORD: &str = "Record";

impl AttributeInfo {
    /// The attribute's name, resolved through the constant pool.
    pub fn name<'a>(&self, pool: &'a [ConstantInfo]) -> Option<&'a str> {
        crate::constant_info::get_utf8(pool, self.attribute_name_index)
    }

    /// Decode the payload as a typed attribute struct.
    pub fn decode<T>(&self) -> BinResult<T>
    where
        T: for<'a> BinRead<Args<'a> = ()>,
    {
        T::read_options(&mut Cursor::new(&self.info), binrw::Endian::Big, ())
    }

    /// Assemble a raw attribute from a typed payload.
    pub fn encode<T>(attribute_name_index: u16, payload: &T) -> BinResult<AttributeInfo>
    where
        T: for<'a> BinWrite<Args<'a> = ()>,
    {
        let mut buf = Cursor::new(Vec::new());
        payload.write_options(&mut buf, binrw::Endian::Big, ())?;
        let info = buf.into_inner();
        Ok(AttributeInfo {
            attribute_name_index,
            attribute_length: info.len() as u32,
            info,
        })
    }
}

/// Find an attribute by name.
pub fn find_attribute<'a>(
    attributes: &'a [AttributeInfo],
    pool: &[ConstantInfo],
    name: &str,
) -> Option<&'a AttributeInfo> {
    attributes.iter().find(|a| a.name(pool) == Some(name))
}

/// Find and decode an attribute in one step. Returns `None` when the
/// attribute is absent, `Some(Err(..))` when it is present but malformed.
pub fn decode_attribute<T>(
    attributes: &[AttributeInfo],
    pool: &[ConstantInfo],
    name: &str,
) -> Option<BinResult<T>>
where
    T: for<'a> BinRead<Args<'a> = ()>,
{
    find_attribute(attributes, pool, name).map(|a| a.decode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_info::Utf8Constant;

    #[test]
    fn decode_round_trip() {
        let payload = SignatureAttribute { signature_index: 9 };
        let raw = AttributeInfo::encode(3, &payload).unwrap();
        assert_eq!(raw.attribute_length, 2);
        assert_eq!(raw.decode::<SignatureAttribute>().unwrap(), payload);
    }

    #[test]
    fn find_by_name() {
        let pool = vec![
            ConstantInfo::Utf8(Utf8Constant::from_str(SIGNATURE)),
            ConstantInfo::Utf8(Utf8Constant::from_str(CODE)),
        ];
        let attrs = vec![
            AttributeInfo {
                attribute_name_index: 1,
                attribute_length: 0,
                info: vec![],
            },
            AttributeInfo {
                attribute_name_index: 2,
                attribute_length: 0,
                info: vec![],
            },
        ];

        assert!(find_attribute(&attrs, &pool, CODE).is_some());
        assert!(find_attribute(&attrs, &pool, ENCLOSING_METHOD).is_none());
    }
}
