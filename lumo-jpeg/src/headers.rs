//! Decode JPEG markers/segments
//!
//! This file deals with decoding header information in a jpeg file.
//!
//! A good guide on markers can be found
//! [here](http://vip.sugovica.hu/Sardi/kepnezo/JPEG%20File%20Layout%20and%20Format.htm)

use lumo_core::colorspace::ColorSpace;

use crate::components::Components;
use crate::decoder::{MAX_COMPONENTS, MAX_TABLES};
use crate::errors::{DecodeErrors, UnsupportedSchemes};
use crate::huffman::HuffmanTable;
use crate::JpegDecoder;

/// **B.2.4.2 Huffman table-specification syntax**
#[allow(clippy::similar_names)]
pub(crate) fn parse_huffman(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors>
{
    // Read the length of the Huffman table
    let mut dht_length =
        i32::from(decoder.stream.get_u16_be_err()?.checked_sub(2).ok_or(
            DecodeErrors::FormatStatic("Invalid Huffman length in image")
        )?);

    // A single DHT segment may contain multiple Huffman tables.
    while dht_length > 16
    {
        // HT information
        let ht_info = decoder.stream.get_u8_err()?;
        // third bit indicates whether the table is a DC or AC type
        let dc_or_ac = (ht_info >> 4) & 0xF;
        // position of this table, should be less than 4
        let index = usize::from(ht_info & 0xF);

        if index >= MAX_TABLES
        {
            return Err(DecodeErrors::MalformedSegment(format!(
                "Invalid DHT index {index}, expected between 0 and 3"
            )));
        }

        if dc_or_ac > 1
        {
            return Err(DecodeErrors::MalformedSegment(format!(
                "Invalid DHT class {dc_or_ac}, expected 0 or 1"
            )));
        }

        // counts of codes of length 1..=16
        let mut num_symbols: [u8; 17] = [0; 17];

        decoder.stream.read_exact_bytes(&mut num_symbols[1..17])?;

        dht_length -= 1 + 16;

        let symbols_sum: i32 = num_symbols.iter().map(|f| i32::from(*f)).sum();

        // The sum of the number of symbols cannot be greater than 256
        if symbols_sum > 256
        {
            return Err(DecodeErrors::MalformedHuffmanTable(
                "Encountered Huffman table with excessive length in DHT".to_string()
            ));
        }

        if symbols_sum > dht_length
        {
            return Err(DecodeErrors::MalformedHuffmanTable(format!(
                "Huffman table of length {symbols_sum} found when the segment has {dht_length} bytes left"
            )));
        }

        dht_length -= symbols_sum;

        // A table containing symbols in increasing code length
        let mut symbols = [0; 256];

        #[allow(clippy::cast_sign_loss)]
        decoder
            .stream
            .read_exact_bytes(&mut symbols[0..(symbols_sum as usize)])?;

        trace!(
            "DHT: class {}, id {}, {} symbols",
            dc_or_ac,
            index,
            symbols_sum
        );

        // store, replacing any earlier table with the same id
        match dc_or_ac
        {
            0 =>
            {
                decoder.dc_huffman_tables[index] =
                    Some(HuffmanTable::new(&num_symbols, symbols, true)?);
            }
            _ =>
            {
                decoder.ac_huffman_tables[index] =
                    Some(HuffmanTable::new(&num_symbols, symbols, false)?);
            }
        }
    }

    if dht_length > 0
    {
        return Err(DecodeErrors::MalformedSegment(
            "Bogus Huffman table definition".to_string()
        ));
    }

    Ok(())
}

/// **B.2.4.1 Quantization table-specification syntax**
#[allow(clippy::cast_possible_truncation, clippy::needless_range_loop)]
pub(crate) fn parse_dqt(img: &mut JpegDecoder) -> Result<(), DecodeErrors>
{
    // read length
    let mut qt_length = img
        .stream
        .get_u16_be_err()?
        .checked_sub(2)
        .ok_or(DecodeErrors::FormatStatic(
            "Invalid DQT length. Length should be greater than 2"
        ))?;

    // A single DQT segment may have multiple quantization tables.
    while qt_length > 0
    {
        let qt_info = img.stream.get_u8_err()?;

        // 0 = 8 bit, 1 = 16 bit entries
        let precision = usize::from(qt_info >> 4);
        // last 4 bits give us the table position
        let table_position = usize::from(qt_info & 0x0f);
        let precision_bytes = 64 * (precision + 1);

        if table_position >= MAX_TABLES
        {
            return Err(DecodeErrors::MalformedSegment(format!(
                "Too large table position for QT: {table_position}, expected between 0 and 3"
            )));
        }

        if (precision_bytes + 1) as u16 > qt_length
        {
            return Err(DecodeErrors::MalformedSegment(format!(
                "Invalid QT table bytes left: {qt_length}, too small for a table of precision {precision}"
            )));
        }

        // The table stays in the order it is stored in the file,
        // which is zig-zag order, matching the order coefficients
        // come off the entropy stream.
        let qt_values = match precision
        {
            0 =>
            {
                let mut values = [0_u8; 64];

                img.stream.read_exact_bytes(&mut values)?;

                let mut table = [0_i32; 64];

                for i in 0..64
                {
                    table[i] = i32::from(values[i]);
                }

                table
            }
            1 =>
            {
                let mut table = [0_i32; 64];

                for i in 0..64
                {
                    table[i] = i32::from(img.stream.get_u16_be_err()?);
                }

                table
            }
            _ =>
            {
                return Err(DecodeErrors::MalformedSegment(format!(
                    "Expected QT precision value of either 0 or 1, found {precision}"
                )));
            }
        };

        qt_length -= (precision_bytes as u16) + 1;

        trace!("DQT: table {table_position}, precision {precision}");

        img.qt_tables[table_position] = Some(qt_values);
    }

    return Ok(());
}

/// Section: `B.2.2 Frame header syntax`
pub(crate) fn parse_start_of_frame(img: &mut JpegDecoder) -> Result<(), DecodeErrors>
{
    if img.seen_sof
    {
        return Err(DecodeErrors::MalformedSegment(
            "Two start of frame markers".to_string()
        ));
    }

    // Get length of the frame header
    let length = img.stream.get_u16_be_err()?;

    // usually 8, but can be 12 and 16; the decoder handles only 8
    let dt_precision = img.stream.get_u8_err()?;

    if dt_precision != 8
    {
        return Err(DecodeErrors::Unsupported(UnsupportedSchemes::SamplePrecision(dt_precision)));
    }

    img.info.pixel_density = dt_precision;

    // read and set the image height
    let img_height = img.stream.get_u16_be_err()?;
    img.info.height = img_height;

    // read and set the image width
    let img_width = img.stream.get_u16_be_err()?;
    img.info.width = img_width;

    trace!("Image width  :{}", img_width);
    trace!("Image height :{}", img_height);

    // Check image width or height is zero
    if img_width == 0 || img_height == 0
    {
        return Err(DecodeErrors::MalformedSegment(
            "Zero width or height is not valid".to_string()
        ));
    }

    if usize::from(img_width) > img.options.get_max_width()
    {
        return Err(DecodeErrors::LargeDimensions(usize::from(img_width)));
    }

    if usize::from(img_height) > img.options.get_max_height()
    {
        return Err(DecodeErrors::LargeDimensions(usize::from(img_height)));
    }

    // Number of components for the image
    let num_components = img.stream.get_u8_err()?;

    if num_components == 0
    {
        return Err(DecodeErrors::MalformedSegment(
            "Number of components cannot be zero".to_string()
        ));
    }

    // This pipeline is built around one luma and two chroma
    // channels; anything else is declined up front.
    if num_components != 1 && num_components != 3
    {
        return Err(DecodeErrors::Unsupported(UnsupportedSchemes::ComponentCount(num_components)));
    }

    let expected = 8 + 3 * u16::from(num_components);

    if length != expected
    {
        return Err(DecodeErrors::MalformedSegment(format!(
            "Length of start of frame differs from expected {expected}, value is {length}"
        )));
    }

    trace!("Image components : {}", num_components);

    if num_components == 1
    {
        img.input_colorspace = ColorSpace::Luma;
        debug!("Single component image, input colorspace set to Luma");
    }

    // set number of components
    img.info.components = num_components;

    let mut components = Vec::with_capacity(usize::from(num_components));
    let mut temp = [0; 3];

    for pos in 0..num_components
    {
        // read 3 bytes for each component
        img.stream.read_exact_bytes(&mut temp)?;

        components.push(Components::from(temp, pos)?);
    }

    // compute the interleaved MCU grid
    for component in &components
    {
        img.h_max = img.h_max.max(component.horizontal_sample);
        img.v_max = img.v_max.max(component.vertical_sample);
    }

    img.mcu_width = img.h_max * 8;
    img.mcu_height = img.v_max * 8;
    // Number of MCUs per width and height, rounded up to cover
    // partial blocks at the edges
    img.mcu_x = (usize::from(img_width) + img.mcu_width - 1) / img.mcu_width;
    img.mcu_y = (usize::from(img_height) + img.mcu_height - 1) / img.mcu_height;

    img.components = components;
    img.seen_sof = true;

    Ok(())
}

/// Parse a start of scan segment.
pub(crate) fn parse_sos(image: &mut JpegDecoder) -> Result<(), DecodeErrors>
{
    if !image.seen_sof
    {
        return Err(DecodeErrors::FormatStatic(
            "Start of scan arrived before start of frame"
        ));
    }

    // Scan header length
    let ls = image.stream.get_u16_be_err()?;
    // Number of image components in scan
    let ns = image.stream.get_u8_err()?;

    if ls != 6 + 2 * u16::from(ns)
    {
        return Err(DecodeErrors::MalformedSegment(format!(
            "Bad SOS length {ls}, corrupt jpeg"
        )));
    }

    // Baseline images carry the whole frame in one scan; a scan over
    // a subset of the components would be a multi-scan file.
    if usize::from(ns) != image.components.len()
    {
        return Err(DecodeErrors::MalformedSegment(format!(
            "Scan covers {ns} components but the frame declared {}",
            image.components.len()
        )));
    }

    let mut seen = [false; MAX_COMPONENTS];

    for scan_pos in 0..usize::from(ns)
    {
        let id = image.stream.get_u8_err()?;

        // DC and AC huffman table positions;
        // top 4 bits contain the dc huffman table id,
        // the lower four bits the ac huffman table id
        let y = image.stream.get_u8_err()?;

        let dc_huff_table = usize::from((y >> 4) & 0xF);
        let ac_huff_table = usize::from(y & 0xF);

        if dc_huff_table >= MAX_TABLES || ac_huff_table >= MAX_TABLES
        {
            return Err(DecodeErrors::MalformedSegment(format!(
                "Huffman table ids ({dc_huff_table},{ac_huff_table}) out of range, expected between 0 and 3"
            )));
        }

        // find the frame component this scan entry refers to
        let position = image
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| {
                DecodeErrors::MalformedSegment(format!(
                    "Scan references component id {id} not present in the frame"
                ))
            })?;

        if seen[position]
        {
            return Err(DecodeErrors::MalformedSegment(format!(
                "Component id {id} appears twice in the scan header"
            )));
        }

        seen[position] = true;

        let component = &mut image.components[position];

        component.dc_huff_table = dc_huff_table;
        component.ac_huff_table = ac_huff_table;

        image.z_order[scan_pos] = position;

        trace!(
            "Assigned huffman tables {}/{} to component id {}",
            dc_huff_table,
            ac_huff_table,
            id
        );
    }

    // Spectral selection and successive approximation bytes; always
    // present, only meaningful for progressive images.
    let spec_start = image.stream.get_u8_err()?;
    let spec_end = image.stream.get_u8_err()?;
    let bit_approx = image.stream.get_u8_err()?;

    trace!(
        "Ss={}, Se={}, Ah={}, Al={}",
        spec_start,
        spec_end,
        bit_approx >> 4,
        bit_approx & 0xF
    );

    Ok(())
}

/// Parse the APP0 (JFIF) segment.
///
/// Only the pixel density fields are kept, the thumbnail, if any,
/// is skipped.
pub(crate) fn parse_app0(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors>
{
    const JFIF_PREFIX: &[u8] = b"JFIF\0";

    let length = usize::from(decoder.stream.get_u16_be_err()?);

    if length < 2
    {
        return Err(DecodeErrors::MalformedSegment(
            "APP0 segment length smaller than 2".to_string()
        ));
    }

    let mut remaining = length - 2;

    if remaining >= 14 && decoder.stream.peek_at(0, JFIF_PREFIX.len())? == JFIF_PREFIX
    {
        decoder.stream.skip(JFIF_PREFIX.len());

        let version = decoder.stream.get_u16_be_err()?;
        let units = decoder.stream.get_u8_err()?;
        let x_density = decoder.stream.get_u16_be_err()?;
        let y_density = decoder.stream.get_u16_be_err()?;

        remaining -= JFIF_PREFIX.len() + 7;

        decoder.info.x_density = x_density;
        decoder.info.y_density = y_density;

        trace!(
            "JFIF version {:x}, density {}x{} (units {})",
            version,
            x_density,
            y_density,
            units
        );
    }

    // skip the thumbnail and anything else we did not read
    decoder.stream.skip(remaining);

    Ok(())
}
