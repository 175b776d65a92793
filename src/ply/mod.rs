//! A PLY mesh decoder. The header and ASCII data sections run through a
//! small buffered scanner sharing the numeric recognizers with the scene
//! tokenizer; binary data is read straight from the file after the header,
//! in either endianness. Variable-length list properties are stored
//! out-of-line from the fixed-size row block, and polygons with more than
//! four vertices are triangulated by repeated clipping of the sharpest
//! ear.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, ErrorKind, Result};
use crate::reader::tokenizer::{scan_double, scan_int};
use crate::scene::entities::TriangleMesh;
use crate::Float;

const PLY_READ_BUFFER_SIZE: usize = 32 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyPropertyType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl PlyPropertyType {
    pub fn size(self) -> usize {
        match self {
            PlyPropertyType::Char | PlyPropertyType::UChar => 1,
            PlyPropertyType::Short | PlyPropertyType::UShort => 2,
            PlyPropertyType::Int | PlyPropertyType::UInt | PlyPropertyType::Float => 4,
            PlyPropertyType::Double => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, PlyPropertyType::Float | PlyPropertyType::Double)
    }
}

/// Type names and their aliases as they appear in headers.
const TYPE_ALIASES: &[(&str, PlyPropertyType)] = &[
    ("char", PlyPropertyType::Char),
    ("uchar", PlyPropertyType::UChar),
    ("short", PlyPropertyType::Short),
    ("ushort", PlyPropertyType::UShort),
    ("int", PlyPropertyType::Int),
    ("uint", PlyPropertyType::UInt),
    ("float", PlyPropertyType::Float),
    ("double", PlyPropertyType::Double),
    ("uint8", PlyPropertyType::UChar),
    ("uint16", PlyPropertyType::UShort),
    ("uint32", PlyPropertyType::UInt),
    ("int8", PlyPropertyType::Char),
    ("int16", PlyPropertyType::Short),
    ("int32", PlyPropertyType::Int),
];

#[derive(Debug, Default, Clone)]
pub struct PlyProperty {
    pub name: String,
    pub ty: Option<PlyPropertyType>,
    /// `Some` marks a variable-length list property; the value is the type
    /// of the per-row count.
    pub count_type: Option<PlyPropertyType>,
    /// Byte offset within the fixed-size row block. Unused for lists.
    pub offset: usize,
    /// Concatenated item data for list properties.
    list_data: Vec<u8>,
    row_start: Vec<u32>,
    row_count: Vec<u32>,
}

impl PlyProperty {
    fn item_type(&self) -> PlyPropertyType {
        self.ty.expect("property type is set during header parsing")
    }

    fn is_list(&self) -> bool {
        self.count_type.is_some()
    }
}

#[derive(Debug, Default, Clone)]
pub struct PlyElement {
    pub name: String,
    pub count: u32,
    pub fixed_size: bool,
    pub row_stride: usize,
    pub properties: Vec<PlyProperty>,
}

impl PlyElement {
    pub fn find_property(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| !p.is_list() && p.name == name)
    }

    fn find_list_property(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| p.is_list() && p.name == name)
    }

    /// Indices of the `x`, `y`, `z` properties.
    pub fn find_pos(&self) -> Option<[usize; 3]> {
        Some([
            self.find_property("x")?,
            self.find_property("y")?,
            self.find_property("z")?,
        ])
    }

    /// Indices of the `nx`, `ny`, `nz` properties.
    pub fn find_normal(&self) -> Option<[usize; 3]> {
        Some([
            self.find_property("nx")?,
            self.find_property("ny")?,
            self.find_property("nz")?,
        ])
    }

    /// Indices of a texture coordinate pair under any of its customary
    /// names.
    pub fn find_texcoord(&self) -> Option<[usize; 2]> {
        for (u, v) in [
            ("u", "v"),
            ("s", "t"),
            ("texture_u", "texture_v"),
            ("texture_s", "texture_t"),
        ] {
            if let (Some(u), Some(v)) = (self.find_property(u), self.find_property(v)) {
                return Some([u, v]);
            }
        }
        None
    }

    /// The face-index list property.
    pub fn find_indices(&self) -> Option<usize> {
        self.find_list_property("vertex_indices")
            .or_else(|| self.find_list_property("vertex_index"))
    }
}

fn is_space(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\r'
}

fn is_safe_buffer_end(b: u8) -> bool {
    (b > 0 && b <= 32) || b >= 127
}

fn is_keyword_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_keyword_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub struct PlyReader {
    file: File,
    filename: String,
    pub format: PlyFormat,
    pub version: (i32, i32),
    pub elements: Vec<PlyElement>,

    /// Fixed-size row block of the most recently loaded element.
    element_data: Vec<u8>,

    buf: Box<[u8]>,
    buf_end: usize,
    pos: usize,
    end: usize,
    at_eof: bool,
    buf_offset: u64,
}

impl PlyReader {
    pub fn open(filename: &str) -> Result<PlyReader> {
        let file = File::open(filename)
            .map_err(|_| Error::new(ErrorKind::FileOpen(filename.to_string())))?;

        let mut reader = PlyReader {
            file,
            filename: filename.to_string(),
            format: PlyFormat::Ascii,
            version: (0, 0),
            elements: Vec::new(),
            element_data: Vec::new(),
            buf: vec![0u8; PLY_READ_BUFFER_SIZE + 1].into_boxed_slice(),
            buf_end: PLY_READ_BUFFER_SIZE,
            pos: PLY_READ_BUFFER_SIZE,
            end: PLY_READ_BUFFER_SIZE,
            at_eof: false,
            buf_offset: 0,
        };
        reader.refill()?;
        reader.parse_header()?;
        Ok(reader)
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error {
            filename: self.filename.clone(),
            offset: self.buf_offset + self.pos as u64,
            line: 0,
            column: 0,
            kind,
        }
    }

    fn invalid_header(&self) -> Error {
        self.error(ErrorKind::PlyInvalidHeader(self.filename.clone()))
    }

    //
    // Text scanning (header and ASCII data)
    //

    fn refill(&mut self) -> io::Result<bool> {
        if self.at_eof {
            return Ok(false);
        }

        let remaining = self.buf_end - self.pos;
        if remaining > 0 && self.pos > 0 {
            self.buf.copy_within(self.pos..self.buf_end, 0);
        }
        self.buf_offset = self.file.stream_position()? - remaining as u64;

        let mut filled = remaining;
        while filled < PLY_READ_BUFFER_SIZE {
            let n = self.file.read(&mut self.buf[filled..PLY_READ_BUFFER_SIZE])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        self.at_eof = filled < PLY_READ_BUFFER_SIZE;

        self.buf_end = filled;
        self.pos = 0;
        self.end = remaining;

        if !self.at_eof {
            let mut offset: i64 = 0;
            while self.buf_end > 0 && !is_safe_buffer_end(self.buf[self.buf_end - 1]) {
                self.buf_end -= 1;
                offset -= 1;
            }
            if offset != 0 {
                self.file.seek(SeekFrom::Current(offset))?;
            }
            if self.buf_end == 0 {
                return Ok(false);
            }
        }

        self.buf[self.buf_end] = 0;
        Ok(true)
    }

    /// Advances to the next non-space character on the current line.
    fn advance(&mut self) -> io::Result<bool> {
        self.pos = self.end;
        loop {
            while is_space(self.buf[self.pos]) {
                self.pos += 1;
            }
            if self.pos == self.buf_end {
                self.end = self.pos;
                if self.refill()? {
                    continue;
                }
                return Ok(false);
            }
            break;
        }
        self.end = self.pos;
        Ok(true)
    }

    /// Moves to the start of the next line, skipping `comment` and
    /// `obj_info` lines.
    fn next_line(&mut self) -> io::Result<bool> {
        self.pos = self.end;
        loop {
            loop {
                if self.pos == self.buf_end {
                    self.end = self.pos;
                    if !self.refill()? {
                        return Ok(false);
                    }
                    continue;
                }
                if self.buf[self.pos] == b'\n' {
                    break;
                }
                self.pos += 1;
            }
            self.pos += 1;
            self.end = self.pos;

            if self.match_str("comment") || self.match_str("obj_info") {
                continue;
            }
            return Ok(true);
        }
    }

    fn match_str(&mut self, s: &str) -> bool {
        let mut pos = self.pos;
        for &b in s.as_bytes() {
            if self.buf[pos] != b {
                return false;
            }
            pos += 1;
        }
        self.end = pos;
        true
    }

    fn keyword(&mut self, kw: &str) -> bool {
        self.match_str(kw) && !is_keyword_part(self.buf[self.end])
    }

    fn identifier(&mut self) -> Option<String> {
        let mut pos = self.pos;
        if !is_keyword_start(self.buf[pos]) {
            return None;
        }
        while is_keyword_part(self.buf[pos]) {
            pos += 1;
        }
        let name = String::from_utf8_lossy(&self.buf[self.pos..pos]).into_owned();
        self.end = pos;
        Some(name)
    }

    fn int_literal(&mut self) -> Option<i32> {
        let (end, value) = scan_int(&self.buf[..=self.buf_end], self.pos)?;
        self.end = end;
        Some(value)
    }

    fn double_literal(&mut self) -> Option<f64> {
        let (end, value) = scan_double(&self.buf[..=self.buf_end], self.pos)?;
        self.end = end;
        Some(value)
    }

    fn which_property_type(&mut self) -> Option<PlyPropertyType> {
        for &(name, ty) in TYPE_ALIASES {
            if self.keyword(name) {
                return Some(ty);
            }
        }
        None
    }

    //
    // Header parsing
    //

    fn parse_header(&mut self) -> Result<()> {
        if !self.keyword("ply") {
            return Err(self.error(ErrorKind::PlyInvalidMagic(self.filename.clone())));
        }
        if !self.next_line()? {
            return Err(self.invalid_header());
        }

        if !(self.keyword("format") && self.advance()?) {
            return Err(self.invalid_header());
        }
        self.format = if self.keyword("ascii") {
            PlyFormat::Ascii
        } else if self.keyword("binary_little_endian") {
            PlyFormat::BinaryLittleEndian
        } else if self.keyword("binary_big_endian") {
            PlyFormat::BinaryBigEndian
        } else {
            return Err(self.invalid_header());
        };

        let ok = self.advance()?
            && self.parse_version()?
            && self.next_line()?
            && self.parse_elements()?
            && self.keyword("end_header")
            && self.consume_end_of_line()?;
        if !ok {
            return Err(self.invalid_header());
        }

        // The scanner will have read past the end of the header while
        // filling its buffer; put the file pointer back to the first data
        // byte for the binary paths.
        if self.format != PlyFormat::Ascii {
            self.file
                .seek(SeekFrom::Start(self.buf_offset + self.end as u64))?;
        }

        for i in 0..self.elements.len() {
            setup_element(&mut self.elements[i]);
        }

        Ok(())
    }

    fn parse_version(&mut self) -> Result<bool> {
        let Some(major) = self.int_literal() else {
            return Ok(false);
        };
        if !(self.advance()? && self.match_str(".") && self.advance()?) {
            return Ok(false);
        }
        let Some(minor) = self.int_literal() else {
            return Ok(false);
        };
        self.version = (major, minor);
        Ok(true)
    }

    fn parse_elements(&mut self) -> Result<bool> {
        while self.keyword("element") {
            if !self.parse_element()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn parse_element(&mut self) -> Result<bool> {
        if !self.advance()? {
            return Ok(false);
        }
        let Some(name) = self.identifier() else {
            return Ok(false);
        };
        if !self.advance()? {
            return Ok(false);
        }
        let Some(count) = self.int_literal() else {
            return Ok(false);
        };
        if count < 0 || !self.next_line()? {
            return Ok(false);
        }

        let mut element = PlyElement {
            name,
            count: count as u32,
            fixed_size: true,
            row_stride: 0,
            properties: Vec::new(),
        };

        while self.keyword("property") {
            if !self.parse_property(&mut element)? {
                return Ok(false);
            }
        }

        self.elements.push(element);
        Ok(true)
    }

    fn parse_property(&mut self, element: &mut PlyElement) -> Result<bool> {
        if !self.advance()? {
            return Ok(false);
        }

        let mut count_type = None;
        if self.keyword("list") {
            if !self.advance()? {
                return Ok(false);
            }
            count_type = self.which_property_type();
            let Some(ct) = count_type else {
                return Err(self.error(ErrorKind::PlyUnknownPropertyType));
            };
            // A fractional list length is meaningless.
            if !ct.is_integer() {
                return Err(self.error(ErrorKind::PlyUnknownPropertyType));
            }
            if !self.advance()? {
                return Ok(false);
            }
        }

        let Some(ty) = self.which_property_type() else {
            return Err(self.error(ErrorKind::PlyUnknownPropertyType));
        };
        if !self.advance()? {
            return Ok(false);
        }
        let Some(name) = self.identifier() else {
            return Ok(false);
        };
        if !self.next_line()? {
            return Ok(false);
        }

        element.properties.push(PlyProperty {
            name,
            ty: Some(ty),
            count_type,
            offset: 0,
            list_data: Vec::new(),
            row_start: Vec::new(),
            row_count: Vec::new(),
        });
        Ok(true)
    }

    /// Consumes spaces up to and including the newline that ends the
    /// current header line, without touching whatever follows it.
    fn consume_end_of_line(&mut self) -> Result<bool> {
        if !self.advance()? {
            // EOF right after end_header is fine for an empty file.
            return Ok(true);
        }
        if !self.match_str("\n") {
            return Ok(false);
        }
        Ok(true)
    }

    //
    // Element data loading
    //

    /// Loads the data rows of element `index` into the reader's scratch
    /// block. Elements must be loaded in file order.
    pub fn load_element(&mut self, index: usize) -> Result<()> {
        let mut element = std::mem::take(&mut self.elements[index]);
        let result = if element.fixed_size {
            self.load_fixed_size_element(&mut element)
        } else {
            self.load_variable_size_element(&mut element)
        };
        self.elements[index] = element;
        result
    }

    pub fn element_data(&self) -> &[u8] {
        &self.element_data
    }

    fn load_fixed_size_element(&mut self, element: &mut PlyElement) -> Result<()> {
        self.element_data.clear();
        self.element_data
            .resize(element.count as usize * element.row_stride, 0);

        if self.format == PlyFormat::Ascii {
            let mut back = 0;
            let mut value = [0u8; 8];
            for _ in 0..element.count {
                for prop in &element.properties {
                    let ty = prop.item_type();
                    self.ascii_value(ty, &mut value)?;
                    let size = ty.size();
                    self.element_data[back..back + size].copy_from_slice(&value[..size]);
                    back += size;
                }
                let _ = self.next_line().map_err(Error::from)?;
            }
        } else {
            // The whole element is one contiguous read.
            self.file
                .read_exact(&mut self.element_data)
                .map_err(|_| self.error(ErrorKind::PlyUnexpectedEof))?;

            if self.format == PlyFormat::BinaryBigEndian {
                let mut offset = 0;
                for _ in 0..element.count {
                    for prop in &element.properties {
                        let size = prop.item_type().size();
                        self.element_data[offset..offset + size].reverse();
                        offset += size;
                    }
                }
            }
        }

        Ok(())
    }

    fn load_variable_size_element(&mut self, element: &mut PlyElement) -> Result<()> {
        self.element_data.clear();
        self.element_data
            .resize(element.count as usize * element.row_stride, 0);

        let mut back = 0;
        let mut value = [0u8; 8];
        for _ in 0..element.count {
            for prop in &mut element.properties {
                match (self.format, prop.is_list()) {
                    (PlyFormat::Ascii, false) => {
                        let ty = prop.item_type();
                        self.ascii_value(ty, &mut value)?;
                        let size = ty.size();
                        self.element_data[back..back + size].copy_from_slice(&value[..size]);
                        back += size;
                    }
                    (PlyFormat::Ascii, true) => self.load_ascii_list(prop)?,
                    (_, false) => {
                        let size = prop.item_type().size();
                        self.file
                            .read_exact(&mut self.element_data[back..back + size])
                            .map_err(|_| self.error(ErrorKind::PlyUnexpectedEof))?;
                        if self.format == PlyFormat::BinaryBigEndian {
                            self.element_data[back..back + size].reverse();
                        }
                        back += size;
                    }
                    (_, true) => self.load_binary_list(prop)?,
                }
            }
            if self.format == PlyFormat::Ascii {
                let _ = self.next_line().map_err(Error::from)?;
            }
        }

        Ok(())
    }

    fn load_ascii_list(&mut self, prop: &mut PlyProperty) -> Result<()> {
        if !self.advance().map_err(Error::from)? {
            return Err(self.error(ErrorKind::PlyUnexpectedEof));
        }
        let count = self
            .int_literal()
            .ok_or_else(|| self.error(ErrorKind::PlyInvalidValue))?;
        if count < 0 {
            return Err(self.error(ErrorKind::PlyNegativeCount));
        }

        let ty = prop.item_type();
        let size = ty.size();
        let back = prop.list_data.len();
        prop.row_start.push(back as u32);
        prop.row_count.push(count as u32);
        prop.list_data.resize(back + size * count as usize, 0);

        let mut value = [0u8; 8];
        for i in 0..count as usize {
            self.ascii_value(ty, &mut value)?;
            let at = back + i * size;
            prop.list_data[at..at + size].copy_from_slice(&value[..size]);
        }
        Ok(())
    }

    fn load_binary_list(&mut self, prop: &mut PlyProperty) -> Result<()> {
        let count_type = prop.count_type.expect("list property has a count type");
        let mut raw = [0u8; 8];
        let count_size = count_type.size();
        self.file
            .read_exact(&mut raw[..count_size])
            .map_err(|_| self.error(ErrorKind::PlyUnexpectedEof))?;
        if self.format == PlyFormat::BinaryBigEndian {
            raw[..count_size].reverse();
        }

        let count = match count_type {
            PlyPropertyType::Char => raw[0] as i8 as i64,
            PlyPropertyType::UChar => raw[0] as i64,
            PlyPropertyType::Short => LittleEndian::read_i16(&raw) as i64,
            PlyPropertyType::UShort => LittleEndian::read_u16(&raw) as i64,
            PlyPropertyType::Int => LittleEndian::read_i32(&raw) as i64,
            PlyPropertyType::UInt => LittleEndian::read_u32(&raw) as i64,
            _ => return Err(self.error(ErrorKind::PlyInvalidValue)),
        };
        if count < 0 {
            return Err(self.error(ErrorKind::PlyNegativeCount));
        }

        let size = prop.item_type().size();
        let back = prop.list_data.len();
        prop.row_start.push(back as u32);
        prop.row_count.push(count as u32);
        prop.list_data.resize(back + size * count as usize, 0);

        self.file
            .read_exact(&mut prop.list_data[back..])
            .map_err(|_| self.error(ErrorKind::PlyUnexpectedEof))?;

        if self.format == PlyFormat::BinaryBigEndian && size > 1 {
            for item in prop.list_data[back..].chunks_exact_mut(size) {
                item.reverse();
            }
        }
        Ok(())
    }

    /// Parses one whitespace-delimited numeric token into the byte
    /// representation of the given type.
    fn ascii_value(&mut self, ty: PlyPropertyType, out: &mut [u8; 8]) -> Result<()> {
        if !self.advance().map_err(Error::from)? {
            return Err(self.error(ErrorKind::PlyUnexpectedEof));
        }

        match ty {
            PlyPropertyType::Char | PlyPropertyType::UChar | PlyPropertyType::Short
            | PlyPropertyType::UShort | PlyPropertyType::Int | PlyPropertyType::UInt => {
                let v = self
                    .int_literal()
                    .ok_or_else(|| self.error(ErrorKind::PlyInvalidValue))?;
                match ty {
                    PlyPropertyType::Char | PlyPropertyType::UChar => out[0] = v as u8,
                    PlyPropertyType::Short | PlyPropertyType::UShort => {
                        LittleEndian::write_i16(out, v as i16)
                    }
                    _ => LittleEndian::write_i32(out, v),
                }
            }
            PlyPropertyType::Float => {
                let v = self
                    .double_literal()
                    .ok_or_else(|| self.error(ErrorKind::PlyInvalidValue))?;
                LittleEndian::write_f32(out, v as f32);
            }
            PlyPropertyType::Double => {
                let v = self
                    .double_literal()
                    .ok_or_else(|| self.error(ErrorKind::PlyInvalidValue))?;
                LittleEndian::write_f64(out, v);
            }
        }
        Ok(())
    }

    //
    // Column extraction
    //

    /// Pulls the named scalar columns of the loaded element `index` out
    /// into an interleaved float array, `props.len()` values per row.
    pub fn extract_columns(&self, index: usize, props: &[usize]) -> Vec<Float> {
        let element = &self.elements[index];
        let n = props.len();
        let rows = element.count as usize;
        let mut out = vec![0.0; rows * n];

        let all_float = props
            .iter()
            .all(|&p| element.properties[p].item_type() == PlyPropertyType::Float);
        let contiguous = props.windows(2).all(|w| {
            element.properties[w[1]].offset == element.properties[w[0]].offset + 4
        });

        if all_float && contiguous {
            let first = element.properties[props[0]].offset;
            if first == 0 && element.row_stride == n * 4 {
                // The requested columns are the whole row; one bulk
                // conversion covers the entire block.
                LittleEndian::read_f32_into(&self.element_data, &mut out);
            } else {
                for row in 0..rows {
                    let src = row * element.row_stride + first;
                    LittleEndian::read_f32_into(
                        &self.element_data[src..src + n * 4],
                        &mut out[row * n..(row + 1) * n],
                    );
                }
            }
        } else {
            for row in 0..rows {
                for (i, &p) in props.iter().enumerate() {
                    let prop = &element.properties[p];
                    let src = row * element.row_stride + prop.offset;
                    out[row * n + i] =
                        convert_cell(&self.element_data[src..], prop.item_type());
                }
            }
        }

        out
    }

    /// The rows of a list property of the loaded element `index`, each
    /// converted to i32.
    pub fn extract_list_rows(&self, index: usize, prop: usize) -> Vec<Vec<i32>> {
        let prop = &self.elements[index].properties[prop];
        let ty = prop.item_type();
        let size = ty.size();

        prop.row_start
            .iter()
            .zip(prop.row_count.iter())
            .map(|(&start, &count)| {
                (0..count as usize)
                    .map(|i| {
                        let at = start as usize + i * size;
                        convert_cell_int(&prop.list_data[at..], ty)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Splits an element's properties into the fixed-size row block (scalars,
/// packed in declaration order) and out-of-line lists, computing the row
/// stride.
fn setup_element(element: &mut PlyElement) {
    element.fixed_size = element.properties.iter().all(|p| !p.is_list());

    let mut stride = 0;
    for prop in &mut element.properties {
        if prop.is_list() {
            continue;
        }
        prop.offset = stride;
        stride += prop.item_type().size();
    }
    element.row_stride = stride;
}

fn convert_cell(bytes: &[u8], ty: PlyPropertyType) -> Float {
    match ty {
        PlyPropertyType::Char => bytes[0] as i8 as Float,
        PlyPropertyType::UChar => bytes[0] as Float,
        PlyPropertyType::Short => LittleEndian::read_i16(bytes) as Float,
        PlyPropertyType::UShort => LittleEndian::read_u16(bytes) as Float,
        PlyPropertyType::Int => LittleEndian::read_i32(bytes) as Float,
        PlyPropertyType::UInt => LittleEndian::read_u32(bytes) as Float,
        PlyPropertyType::Float => LittleEndian::read_f32(bytes),
        PlyPropertyType::Double => LittleEndian::read_f64(bytes) as Float,
    }
}

fn convert_cell_int(bytes: &[u8], ty: PlyPropertyType) -> i32 {
    match ty {
        PlyPropertyType::Char => bytes[0] as i8 as i32,
        PlyPropertyType::UChar => bytes[0] as i32,
        PlyPropertyType::Short => LittleEndian::read_i16(bytes) as i32,
        PlyPropertyType::UShort => LittleEndian::read_u16(bytes) as i32,
        PlyPropertyType::Int => LittleEndian::read_i32(bytes),
        PlyPropertyType::UInt => LittleEndian::read_u32(bytes) as i32,
        PlyPropertyType::Float => LittleEndian::read_f32(bytes) as i32,
        PlyPropertyType::Double => LittleEndian::read_f64(bytes) as i32,
    }
}

/// Loads `filename` and materializes its `vertex` and `face` elements as a
/// triangle mesh. Faces with more than three vertices are triangulated;
/// faces with fewer are discarded.
pub fn load_triangle_mesh(filename: &str) -> Result<TriangleMesh> {
    let mut reader = PlyReader::open(filename)?;

    let mut positions: Vec<Float> = Vec::new();
    let mut normals: Vec<Float> = Vec::new();
    let mut uv: Vec<Float> = Vec::new();
    let mut faces: Vec<Vec<i32>> = Vec::new();

    for index in 0..reader.elements.len() {
        reader.load_element(index)?;
        let element = &reader.elements[index];

        if element.name == "vertex" {
            let Some(pos) = element.find_pos() else {
                return Err(reader.error(ErrorKind::PlyMissingMeshData(filename.to_string())));
            };
            let normal = element.find_normal();
            let texcoord = element.find_texcoord();

            positions = reader.extract_columns(index, &pos);
            if let Some(normal) = normal {
                normals = reader.extract_columns(index, &normal);
            }
            if let Some(texcoord) = texcoord {
                uv = reader.extract_columns(index, &texcoord);
            }
        } else if element.name == "face" {
            let Some(prop) = element.find_indices() else {
                return Err(reader.error(ErrorKind::PlyMissingMeshData(filename.to_string())));
            };
            faces = reader.extract_list_rows(index, prop);
        }
    }

    if positions.is_empty() || faces.is_empty() {
        return Err(reader.error(ErrorKind::PlyMissingMeshData(filename.to_string())));
    }

    let num_vertices = (positions.len() / 3) as u32;
    let mut indices = Vec::new();
    for face in &faces {
        for &i in face {
            if i < 0 || i as u32 >= num_vertices {
                return Err(reader.error(ErrorKind::PlyIndexOutOfRange));
            }
        }
        triangulate_face(face, &positions, &mut indices);
    }

    Ok(TriangleMesh {
        indices,
        p: positions,
        n: normals,
        s: Vec::new(),
        uv,
        num_vertices,
        ..TriangleMesh::default()
    })
}

/// Appends the triangulation of one face. Triangles pass through, quads
/// take a fixed split, larger polygons are ear-clipped; degenerate faces
/// with fewer than three vertices are dropped.
fn triangulate_face(face: &[i32], positions: &[Float], out: &mut Vec<i32>) {
    match face.len() {
        0..=2 => {}
        3 => out.extend_from_slice(face),
        4 => {
            out.extend_from_slice(&[face[0], face[1], face[2]]);
            out.extend_from_slice(&[face[0], face[2], face[3]]);
        }
        _ => clip_ears(face, positions, out),
    }
}

fn vertex_pos(positions: &[Float], index: i32) -> [Float; 3] {
    let at = index as usize * 3;
    [positions[at], positions[at + 1], positions[at + 2]]
}

/// Ear clipping in the face plane, always removing the sharpest available
/// ear (the convex corner with the smallest interior angle).
fn clip_ears(face: &[i32], positions: &[Float], out: &mut Vec<i32>) {
    use crate::math::{cross, dot, normalize};

    // Newell's method for the face normal.
    let mut normal = [0.0f32; 3];
    for i in 0..face.len() {
        let a = vertex_pos(positions, face[i]);
        let b = vertex_pos(positions, face[(i + 1) % face.len()]);
        normal[0] += (a[1] - b[1]) * (a[2] + b[2]);
        normal[1] += (a[2] - b[2]) * (a[0] + b[0]);
        normal[2] += (a[0] - b[0]) * (a[1] + b[1]);
    }
    let normal = normalize(normal);

    // Project into 2D coordinates in the face plane.
    let axis = if normal[0].abs() < 0.9 {
        [1.0, 0.0, 0.0]
    } else {
        [0.0, 1.0, 0.0]
    };
    let u_axis = normalize(cross(axis, normal));
    let v_axis = cross(normal, u_axis);

    let mut verts: Vec<(i32, [Float; 2])> = face
        .iter()
        .map(|&i| {
            let p = vertex_pos(positions, i);
            (i, [dot(p, u_axis), dot(p, v_axis)])
        })
        .collect();

    // Normalize to counter-clockwise winding in the projection.
    let mut area = 0.0;
    for i in 0..verts.len() {
        let a = verts[i].1;
        let b = verts[(i + 1) % verts.len()].1;
        area += a[0] * b[1] - b[0] * a[1];
    }
    if area < 0.0 {
        for v in verts.iter_mut() {
            v.1[1] = -v.1[1];
        }
    }

    while verts.len() > 3 {
        let mut best: Option<(usize, Float)> = None;

        for i in 0..verts.len() {
            let prev = verts[(i + verts.len() - 1) % verts.len()].1;
            let cur = verts[i].1;
            let next = verts[(i + 1) % verts.len()].1;

            let e1 = [cur[0] - prev[0], cur[1] - prev[1]];
            let e2 = [next[0] - cur[0], next[1] - cur[1]];
            let turn = e1[0] * e2[1] - e1[1] * e2[0];
            if turn <= 0.0 {
                // Reflex corner, not an ear.
                continue;
            }

            let contains_other = verts.iter().enumerate().any(|(j, v)| {
                j != i
                    && j != (i + verts.len() - 1) % verts.len()
                    && j != (i + 1) % verts.len()
                    && point_in_triangle(v.1, prev, cur, next)
            });
            if contains_other {
                continue;
            }

            let angle = interior_angle(prev, cur, next);
            if best.map_or(true, |(_, best_angle)| angle < best_angle) {
                best = Some((i, angle));
            }
        }

        let Some((ear, _)) = best else {
            // Degenerate polygon; fall back to a fan so we still emit
            // something sensible.
            for i in 1..verts.len() - 1 {
                out.extend_from_slice(&[verts[0].0, verts[i].0, verts[i + 1].0]);
            }
            return;
        };

        let prev = verts[(ear + verts.len() - 1) % verts.len()].0;
        let next = verts[(ear + 1) % verts.len()].0;
        out.extend_from_slice(&[prev, verts[ear].0, next]);
        verts.remove(ear);
    }

    out.extend_from_slice(&[verts[0].0, verts[1].0, verts[2].0]);
}

fn interior_angle(prev: [Float; 2], cur: [Float; 2], next: [Float; 2]) -> Float {
    let a = [prev[0] - cur[0], prev[1] - cur[1]];
    let b = [next[0] - cur[0], next[1] - cur[1]];
    let len = (a[0] * a[0] + a[1] * a[1]).sqrt() * (b[0] * b[0] + b[1] * b[1]).sqrt();
    if len == 0.0 {
        return 0.0;
    }
    ((a[0] * b[0] + a[1] * b[1]) / len).clamp(-1.0, 1.0).acos()
}

fn point_in_triangle(p: [Float; 2], a: [Float; 2], b: [Float; 2], c: [Float; 2]) -> bool {
    fn sign(p: [Float; 2], a: [Float; 2], b: [Float; 2]) -> Float {
        (p[0] - b[0]) * (a[1] - b[1]) - (a[0] - b[0]) * (p[1] - b[1])
    }

    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(name: &str, contents: &[u8]) -> String {
        let path = std::env::temp_dir().join(format!("lumen-ply-{}-{}", std::process::id(), name));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path.display().to_string()
    }

    fn quad_ascii() -> Vec<u8> {
        let mut s = String::new();
        s.push_str("ply\n");
        s.push_str("format ascii 1.0\n");
        s.push_str("comment a unit quad\n");
        s.push_str("element vertex 4\n");
        s.push_str("property float x\n");
        s.push_str("property float y\n");
        s.push_str("property float z\n");
        s.push_str("element face 2\n");
        s.push_str("property list uchar int vertex_indices\n");
        s.push_str("end_header\n");
        s.push_str("0 0 0\n1 0 0\n1 1 0\n0 1 0\n");
        s.push_str("3 0 1 2\n3 0 2 3\n");
        s.into_bytes()
    }

    fn quad_binary_le() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"ply\n");
        data.extend_from_slice(b"format binary_little_endian 1.0\n");
        data.extend_from_slice(b"element vertex 4\n");
        data.extend_from_slice(b"property float x\n");
        data.extend_from_slice(b"property float y\n");
        data.extend_from_slice(b"property float z\n");
        data.extend_from_slice(b"element face 2\n");
        data.extend_from_slice(b"property list uchar int vertex_indices\n");
        data.extend_from_slice(b"end_header\n");
        let verts: [[f32; 3]; 4] = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        for v in verts {
            for c in v {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        for face in [[0i32, 1, 2], [0, 2, 3]] {
            data.push(3);
            for i in face {
                data.extend_from_slice(&i.to_le_bytes());
            }
        }
        data
    }

    #[test]
    fn ascii_quad_loads() {
        let path = write_temp("quad.ply", &quad_ascii());
        let mesh = load_triangle_mesh(&path).unwrap();
        assert_eq!(mesh.num_vertices, 4);
        assert_eq!(mesh.num_indices(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.p[3..6], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn ascii_and_binary_agree() {
        let ascii_path = write_temp("agree-a.ply", &quad_ascii());
        let binary_path = write_temp("agree-b.ply", &quad_binary_le());
        let a = load_triangle_mesh(&ascii_path).unwrap();
        let b = load_triangle_mesh(&binary_path).unwrap();
        assert_eq!(a.p, b.p);
        assert_eq!(a.indices, b.indices);
        assert_eq!(a.n, b.n);
        assert_eq!(a.uv, b.uv);
    }

    #[test]
    fn big_endian_binary_loads() {
        let mut data = Vec::new();
        data.extend_from_slice(b"ply\n");
        data.extend_from_slice(b"format binary_big_endian 1.0\n");
        data.extend_from_slice(b"element vertex 3\n");
        data.extend_from_slice(b"property float x\n");
        data.extend_from_slice(b"property float y\n");
        data.extend_from_slice(b"property float z\n");
        data.extend_from_slice(b"element face 1\n");
        data.extend_from_slice(b"property list uchar int vertex_indices\n");
        data.extend_from_slice(b"end_header\n");
        for v in [[0.0f32, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]] {
            for c in v {
                data.extend_from_slice(&c.to_be_bytes());
            }
        }
        data.push(3);
        for i in [0i32, 1, 2] {
            data.extend_from_slice(&i.to_be_bytes());
        }

        let path = write_temp("bigendian.ply", &data);
        let mesh = load_triangle_mesh(&path).unwrap();
        assert_eq!(mesh.p[3], 2.0);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn mixed_property_types_coerce() {
        let mut s = String::new();
        s.push_str("ply\nformat ascii 1.0\n");
        s.push_str("element vertex 3\n");
        s.push_str("property double x\n");
        s.push_str("property double y\n");
        s.push_str("property double z\n");
        s.push_str("property uchar red\n");
        s.push_str("element face 1\n");
        s.push_str("property list uchar uint vertex_indices\n");
        s.push_str("end_header\n");
        s.push_str("0 0 0 255\n1.5 0 0 0\n0 1.5 0 128\n");
        s.push_str("3 0 1 2\n");

        let path = write_temp("mixed.ply", s.as_bytes());
        let mesh = load_triangle_mesh(&path).unwrap();
        assert_eq!(mesh.p[3], 1.5);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn convex_polygon_yields_n_minus_two_triangles() {
        // A regular hexagon in the xy plane.
        let mut s = String::new();
        s.push_str("ply\nformat ascii 1.0\n");
        s.push_str("element vertex 6\n");
        s.push_str("property float x\nproperty float y\nproperty float z\n");
        s.push_str("element face 1\n");
        s.push_str("property list uchar int vertex_indices\n");
        s.push_str("end_header\n");
        for i in 0..6 {
            let angle = std::f32::consts::TAU * i as f32 / 6.0;
            s.push_str(&format!("{} {} 0\n", angle.cos(), angle.sin()));
        }
        s.push_str("6 0 1 2 3 4 5\n");

        let path = write_temp("hexagon.ply", s.as_bytes());
        let mesh = load_triangle_mesh(&path).unwrap();
        assert_eq!(mesh.indices.len(), 3 * 4);
        assert!(mesh.indices.iter().all(|&i| (0..6).contains(&i)));
    }

    #[test]
    fn faces_with_fewer_than_three_indices_are_discarded() {
        let mut s = String::new();
        s.push_str("ply\nformat ascii 1.0\n");
        s.push_str("element vertex 3\n");
        s.push_str("property float x\nproperty float y\nproperty float z\n");
        s.push_str("element face 2\n");
        s.push_str("property list uchar int vertex_indices\n");
        s.push_str("end_header\n");
        s.push_str("0 0 0\n1 0 0\n0 1 0\n");
        s.push_str("2 0 1\n3 0 1 2\n");

        let path = write_temp("degenerate.ply", s.as_bytes());
        let mesh = load_triangle_mesh(&path).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let mut s = String::new();
        s.push_str("ply\nformat ascii 1.0\n");
        s.push_str("element vertex 3\n");
        s.push_str("property float x\nproperty float y\nproperty float z\n");
        s.push_str("element face 1\n");
        s.push_str("property list uchar int vertex_indices\n");
        s.push_str("end_header\n");
        s.push_str("0 0 0\n1 0 0\n0 1 0\n");
        s.push_str("3 0 1 7\n");

        let path = write_temp("badindex.ply", s.as_bytes());
        let err = load_triangle_mesh(&path).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::PlyIndexOutOfRange));
    }

    #[test]
    fn invalid_magic_is_an_error() {
        let path = write_temp("notply.ply", b"obj\nv 0 0 0\n");
        let err = load_triangle_mesh(&path).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::PlyInvalidMagic(_)));
    }

    #[test]
    fn normals_and_texcoords_extract() {
        let mut s = String::new();
        s.push_str("ply\nformat ascii 1.0\n");
        s.push_str("element vertex 3\n");
        s.push_str("property float x\nproperty float y\nproperty float z\n");
        s.push_str("property float nx\nproperty float ny\nproperty float nz\n");
        s.push_str("property float u\nproperty float v\n");
        s.push_str("element face 1\n");
        s.push_str("property list uchar int vertex_indices\n");
        s.push_str("end_header\n");
        s.push_str("0 0 0 0 0 1 0 0\n");
        s.push_str("1 0 0 0 0 1 1 0\n");
        s.push_str("0 1 0 0 0 1 0 1\n");
        s.push_str("3 0 1 2\n");

        let path = write_temp("attrs.ply", s.as_bytes());
        let mesh = load_triangle_mesh(&path).unwrap();
        assert_eq!(mesh.n.len(), 9);
        assert_eq!(mesh.n[2], 1.0);
        assert_eq!(mesh.uv, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }
}
