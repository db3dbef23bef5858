use std::io::Cursor;

use binrw::{BinRead, BinResult, BinWrite};

use super::types::Instruction;

/// Decode a `Code` attribute's byte array into `(address, instruction)`
/// pairs. Addresses are byte offsets from the start of the code array, which
/// switch instructions need for their alignment padding.
pub fn parse_instructions(code: &[u8]) -> BinResult<Vec<(u32, Instruction)>> {
    let mut cursor = Cursor::new(code);
    let len = code.len() as u64;
    let mut instructions = Vec::new();

    while cursor.position() < len {
        let address = cursor.position() as u32;
        let instruction =
            Instruction::read_options(&mut cursor, binrw::Endian::Big, binrw::args! { address })?;
        instructions.push((address, instruction));
    }

    Ok(instructions)
}

/// Encode an instruction sequence back into a code byte array.
pub fn assemble_instructions(instructions: &[Instruction]) -> BinResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());

    for instruction in instructions {
        let address = cursor.position() as u32;
        instruction.write_options(&mut cursor, binrw::Endian::Big, binrw::args! { address })?;
    }

    Ok(cursor.into_inner())
}
