//! DAF (Double Precision Array File) file record.
//!
//! The first 1024-byte record of an SPK kernel tells the reader how the rest of the
//! file is laid out:
//!
//! * **`idword`**: format identifier, `"DAF/SPK"` for planetary kernels.
//! * **`nd`** / **`ni`**: number of double / integer components in each segment summary
//!   (`2` and `6` for SPK).
//! * **`fward`** / **`bward`**: 1-based record numbers of the first and last summary record.
//! * **`free`**: first free DP-word address.
//! * **`locfmt`**: binary format tag; only `"LTL-IEEE"` is accepted.
//!
//! # See also
//! ------------
//! * [`super::summary_record::read_summaries`] – walks the records `fward` points to.
use std::fmt;

use nom::{bytes::complete::take, number::complete::le_i32, IResult};

use crate::skycheck_errors::SkycheckError;

/// Size in bytes of every DAF record.
pub const DAF_RECORD_BYTES: usize = 1024;

#[derive(Debug, PartialEq, Clone)]
pub struct DAFHeader {
    pub idword: String,
    pub internal_filename: String,
    pub nd: i32,
    pub ni: i32,
    pub fward: i32,
    pub bward: i32,
    pub free: i32,
    pub locfmt: String,
}

impl DAFHeader {
    fn parse_fields(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, id_word) = take(8usize)(input)?;
        let (input, nd) = le_i32(input)?;
        let (input, ni) = le_i32(input)?;
        let (input, ifname) = take(60usize)(input)?;
        let (input, fward) = le_i32(input)?;
        let (input, bward) = le_i32(input)?;
        let (input, free) = le_i32(input)?;
        let (input, locfmt) = take(8usize)(input)?;
        Ok((
            input,
            DAFHeader {
                idword: String::from_utf8_lossy(id_word).trim().to_string(),
                internal_filename: String::from_utf8_lossy(ifname).trim().to_string(),
                nd,
                ni,
                fward,
                bward,
                free,
                locfmt: String::from_utf8_lossy(locfmt)
                    .trim_end_matches(['\0', ' '])
                    .to_string(),
            },
        ))
    }

    /// Parse and validate the file record of an SPK kernel.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: the kernel bytes, starting at offset 0.
    ///
    /// Return
    /// ----------
    /// * The header, or [`SkycheckError::InvalidKernel`] when the file is not a
    ///   little-endian DAF/SPK with a usable summary layout.
    pub fn parse(input: &[u8]) -> Result<Self, SkycheckError> {
        if input.len() < DAF_RECORD_BYTES {
            return Err(SkycheckError::InvalidKernel(format!(
                "file is {} bytes, shorter than one DAF record",
                input.len()
            )));
        }
        let (_, header) = Self::parse_fields(input)?;

        if header.idword != "DAF/SPK" {
            return Err(SkycheckError::InvalidKernel(format!(
                "unexpected id word {:?}",
                header.idword
            )));
        }
        // Old kernels leave locfmt blank; those are little-endian in practice.
        if !header.locfmt.is_empty() && header.locfmt != "LTL-IEEE" {
            return Err(SkycheckError::InvalidKernel(format!(
                "unsupported binary format {:?}",
                header.locfmt
            )));
        }
        if header.nd < 2 || header.ni < 6 || header.fward < 2 {
            return Err(SkycheckError::InvalidKernel(format!(
                "bad summary layout nd={} ni={} fward={}",
                header.nd, header.ni, header.fward
            )));
        }
        Ok(header)
    }

    /// Size of one segment summary, in DP words.
    pub fn summary_words(&self) -> usize {
        self.nd as usize + (self.ni as usize).div_ceil(2)
    }
}

impl fmt::Display for DAFHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LABEL_WIDTH: usize = 14;
        const VALUE_WIDTH: usize = 36;

        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = LABEL_WIDTH + 1,
            value = VALUE_WIDTH + 1
        );
        let rows = [
            ("ID Word", self.idword.clone()),
            ("Internal Name", self.internal_filename.clone()),
            ("ND / NI", format!("{} / {}", self.nd, self.ni)),
            ("Summaries", format!("records {} to {}", self.fward, self.bward)),
            ("Free Addr", self.free.to_string()),
            ("Binary Format", self.locfmt.clone()),
        ];

        writeln!(f, "{border}")?;
        for (label, value) in rows {
            writeln!(
                f,
                "| {:<label$}| {:<value$}|",
                label,
                value,
                label = LABEL_WIDTH,
                value = VALUE_WIDTH
            )?;
        }
        writeln!(f, "{border}")
    }
}

#[cfg(test)]
mod test_daf_header {
    use super::*;

    fn file_record(idword: &[u8; 8], locfmt: &[u8; 8]) -> Vec<u8> {
        let mut buf = vec![0u8; DAF_RECORD_BYTES];
        buf[0..8].copy_from_slice(idword);
        buf[8..12].copy_from_slice(&2i32.to_le_bytes());
        buf[12..16].copy_from_slice(&6i32.to_le_bytes());
        buf[16..76].copy_from_slice(&[b' '; 60]);
        buf[16..23].copy_from_slice(b"NIO2SPK");
        buf[76..80].copy_from_slice(&4i32.to_le_bytes());
        buf[80..84].copy_from_slice(&4i32.to_le_bytes());
        buf[84..88].copy_from_slice(&1025i32.to_le_bytes());
        buf[88..96].copy_from_slice(locfmt);
        buf
    }

    #[test]
    fn test_parse_daf_header() {
        let header = DAFHeader::parse(&file_record(b"DAF/SPK ", b"LTL-IEEE")).unwrap();
        assert_eq!(header.idword, "DAF/SPK");
        assert_eq!(header.internal_filename, "NIO2SPK");
        assert_eq!((header.nd, header.ni, header.fward), (2, 6, 4));
        assert_eq!(header.summary_words(), 5);
    }

    #[test]
    fn test_reject_bad_headers() {
        assert!(matches!(
            DAFHeader::parse(&file_record(b"DAF/PCK ", b"LTL-IEEE")),
            Err(SkycheckError::InvalidKernel(_))
        ));
        assert!(DAFHeader::parse(&file_record(b"DAF/SPK ", b"BIG-IEEE")).is_err());
        assert!(DAFHeader::parse(&[0u8; 100]).is_err());
    }

    #[test]
    fn test_display_daf_header() {
        let header = DAFHeader::parse(&file_record(b"DAF/SPK ", b"LTL-IEEE")).unwrap();
        let expected = r#"+---------------+-------------------------------------+
| ID Word       | DAF/SPK                             |
| Internal Name | NIO2SPK                             |
| ND / NI       | 2 / 6                               |
| Summaries     | records 4 to 4                      |
| Free Addr     | 1025                                |
| Binary Format | LTL-IEEE                            |
+---------------+-------------------------------------+
"#;
        assert_eq!(format!("{header}"), expected);
    }
}
