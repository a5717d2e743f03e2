//! Huffman table construction.
//!
//! A DHT segment stores a table in its canonical form, sixteen
//! counts of codes per bit length followed by the symbols in order
//! of increasing code length. This module derives from that form the
//! per-length maximum code and value offset used by the bit-serial
//! symbol decoder in [`bitstream`](crate::bitstream).

#![allow(clippy::similar_names, clippy::module_name_repetitions)]

use crate::errors::DecodeErrors;

/// A Huffman table in derived, decodable form.
pub(crate) struct HuffmanTable
{
    /// Largest code of length k, -1 when the length is unused.
    ///
    /// Element 0 is unused, element 17 is a sentinel that terminates
    /// decoding.
    pub(crate) maxcode: [i32; 18],
    /// Offset such that `values[code + offset[k]]` is the symbol for
    /// `code` of length k. Element 0 is unused.
    pub(crate) offset:  [i32; 18],
    /// Number of symbols with codes of length `k` bits.
    ///
    /// Directly represents the contents of a DHT marker, `bits[0]`
    /// is unused.
    pub(crate) bits:    [u8; 17],
    /// Symbols in order of increasing code length.
    pub(crate) values:  [u8; 256]
}

impl HuffmanTable
{
    /// Build a table from the counts and symbol list of a DHT
    /// segment.
    ///
    /// `is_dc` selects the extra validation applied to DC tables,
    /// whose symbols are bit counts and must fit in `0..=15`.
    pub fn new(codes: &[u8; 17], values: [u8; 256], is_dc: bool)
        -> Result<HuffmanTable, DecodeErrors>
    {
        let mut table = HuffmanTable {
            maxcode: [0; 18],
            offset: [0; 18],
            bits: *codes,
            values
        };

        table.make_derived_table(is_dc)?;

        Ok(table)
    }

    /// Compute the derived values for this Huffman table.
    ///
    /// This is the canonical construction, codes of a given length
    /// are consecutive integers, and the first code of length k is
    /// the successor of the last code of length k-1 shifted left
    /// once.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn make_derived_table(&mut self, is_dc: bool) -> Result<(), DecodeErrors>
    {
        // build a list of code sizes, one entry per symbol
        let mut size = [0_u8; 257];
        let mut huff_code = [0_u32; 257];

        let mut p = 0;

        for length in 1..=16
        {
            for _ in 0..self.bits[length]
            {
                size[p] = length as u8;
                p += 1;
            }
        }

        size[p] = 0;

        let num_symbols = p;

        // Generate the codes themselves, validating that the counts
        // represent a legal Huffman code tree.
        let mut code = 0_u32;
        let mut si = u32::from(size[0]);

        p = 0;

        while size[p] != 0
        {
            while u32::from(size[p]) == si
            {
                huff_code[p] = code;
                code += 1;
                p += 1;
            }
            // code is now one more than the last code used for
            // code-length si; it must still fit in si bits since no
            // code may be all ones.
            if code >= (1_u32 << si)
            {
                return Err(DecodeErrors::MalformedHuffmanTable(format!(
                    "Counts overflow the code space at length {si}"
                )));
            }

            code <<= 1;
            si += 1;
        }

        // Generate the decoding tables for bit-sequential decoding
        p = 0;

        for length in 1..=16
        {
            if self.bits[length] == 0
            {
                // -1 forces the decoder to keep accumulating bits
                // past lengths with no codes
                self.maxcode[length] = -1;
            }
            else
            {
                // offset[l] = index of first symbol of code length l
                // minus the smallest code of length l
                self.offset[length] = p as i32 - huff_code[p] as i32;
                p += usize::from(self.bits[length]);
                self.maxcode[length] = huff_code[p - 1] as i32;
            }
        }

        // ensure decode terminates
        self.offset[17] = 0;
        self.maxcode[17] = 0x000F_FFFF;

        // DC symbols are bit counts for the following differential,
        // anything above 15 cannot be a valid count.
        if is_dc
        {
            for value in &self.values[..num_symbols]
            {
                if *value > 15
                {
                    return Err(DecodeErrors::MalformedHuffmanTable(format!(
                        "DC symbol {value} out of range, expected between 0 and 15"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::HuffmanTable;

    fn table_with(counts: &[u8; 16], symbols: &[u8]) -> HuffmanTable
    {
        let mut codes = [0_u8; 17];
        codes[1..].copy_from_slice(counts);

        let mut values = [0_u8; 256];
        values[..symbols.len()].copy_from_slice(symbols);

        HuffmanTable::new(&codes, values, false).unwrap()
    }

    #[test]
    fn canonical_construction()
    {
        // counts {0,1,5,1,1,1,1,1,1,0,...} assign the first code at
        // length 2 with value 0b00 and the last at length 9 with
        // value 0b1_1111_1110
        let counts = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
        let symbols: Vec<u8> = (0x00..=0x0b).collect();

        let table = table_with(&counts, &symbols);

        assert_eq!(table.maxcode[2], 0b00);
        assert_eq!(table.maxcode[3], 0b110);
        assert_eq!(table.maxcode[9], 0b1_1111_1110);
        assert_eq!(table.maxcode[1], -1);

        // symbol lookup through the offset table
        let decode = |code: i32, length: usize| {
            table.values[((code + table.offset[length]) & 0xFF) as usize]
        };

        assert_eq!(decode(0b00, 2), 0x00);
        assert_eq!(decode(0b010, 3), 0x01);
        assert_eq!(decode(0b110, 3), 0x05);
        assert_eq!(decode(0b1110, 4), 0x06);
        assert_eq!(decode(0b1_1111_1110, 9), 0x0b);
    }

    #[test]
    fn no_code_is_a_prefix_of_another()
    {
        let counts = [0, 2, 2, 0, 5, 1, 5, 1, 0, 0, 0, 0, 0, 0, 0, 0];
        let symbols: Vec<u8> = (0..16).collect();

        let table = table_with(&counts, &symbols);

        // collect (code, length) pairs back out of the derived form
        let mut entries = vec![];
        let mut index = 0;

        for length in 1..=16_usize
        {
            for _ in 0..table.bits[length]
            {
                let code = index as i32 - table.offset[length];
                entries.push((code as u32, length));
                index += 1;
            }
        }

        for (i, (code_a, len_a)) in entries.iter().enumerate()
        {
            for (code_b, len_b) in entries.iter().skip(i + 1)
            {
                assert!(len_a <= len_b);
                // a prefix relation would mean the shorter code
                // equals the longer one shifted down
                assert_ne!(
                    *code_a,
                    code_b >> (len_b - len_a),
                    "code {code_a:b} is a prefix of {code_b:b}"
                );
            }
        }
    }

    #[test]
    fn rejects_overfull_code_space()
    {
        // three codes of length one cannot exist
        let mut codes = [0_u8; 17];
        codes[1] = 3;

        let values = [0_u8; 256];

        assert!(HuffmanTable::new(&codes, values, false).is_err());
    }

    #[test]
    fn rejects_oversized_dc_symbol()
    {
        let mut codes = [0_u8; 17];
        codes[2] = 1;

        let mut values = [0_u8; 256];
        values[0] = 16;

        assert!(HuffmanTable::new(&codes, values, true).is_err());
    }
}
