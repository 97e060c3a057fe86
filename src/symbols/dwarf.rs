//! In-process symbolization from the executable's DWARF debug info.
//!
//! Output mirrors `addr2line -f -a -i` so events look the same whichever
//! backend produced them.

use super::{check_count, parse_pc, SymbolInfo, SymbolResolver};
use crate::utils::config::UNKNOWN_SYMBOL;
use crate::utils::error::SymbolError;
use log::{debug, info};
use object::read::{SymbolMap, SymbolMapEntry};
use object::{Object, ObjectSection, ObjectSymbol, SymbolKind};
use std::borrow::Cow;
use std::path::Path;
use std::rc::Rc;

type Reader = gimli::EndianRcSlice<gimli::RunTimeEndian>;

/// Defined code symbol from the object's symbol table
#[derive(Debug, Clone)]
struct TableSymbol {
    address: u64,
    size: u64,
    name: String,
}

impl SymbolMapEntry for TableSymbol {
    fn address(&self) -> u64 {
        self.address
    }
}

impl TableSymbol {
    /// Sized symbols only cover their own range; unsized labels run to the next symbol
    fn covers(&self, address: u64) -> bool {
        self.size == 0 || address - self.address < self.size
    }
}

/// Resolver backed by an `addr2line::Context` over the loaded ELF
///
/// Function names fall back to the symbol table when DWARF has none,
/// as binutils does.
pub struct DwarfResolver {
    context: addr2line::Context<Reader>,
    symbols: SymbolMap<TableSymbol>,
    /// Hex digits used when echoing addresses (8 for 32-bit, 16 for 64-bit)
    address_width: usize,
}

impl DwarfResolver {
    /// Load debug info from an executable
    ///
    /// # Errors
    /// * `SymbolError::ReadFailed` - file missing or unreadable
    /// * `SymbolError::InvalidObject` - not an object file
    /// * `SymbolError::Dwarf` - debug sections present but unparsable
    pub fn new<P: AsRef<Path>>(elf_path: P) -> Result<Self, SymbolError> {
        let path = elf_path.as_ref();
        debug!("Loading executable for symbolization: {}", path.display());

        let file_data = std::fs::read(path).map_err(|source| SymbolError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let obj = object::File::parse(&*file_data).map_err(|e| SymbolError::InvalidObject {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let endian = if obj.is_little_endian() {
            gimli::RunTimeEndian::Little
        } else {
            gimli::RunTimeEndian::Big
        };

        let load_section = |id: gimli::SectionId| -> Result<Reader, gimli::Error> {
            let data = obj
                .section_by_name(id.name())
                .and_then(|section| section.uncompressed_data().ok())
                .unwrap_or(Cow::Borrowed(&[]));
            let bytes: Rc<[u8]> = Rc::from(data.into_owned());
            Ok(gimli::EndianRcSlice::new(bytes, endian))
        };

        let dwarf = gimli::Dwarf::load(load_section)?;
        let context = addr2line::Context::from_dwarf(dwarf)?;

        if obj.section_by_name(".debug_info").is_none() {
            info!(
                "No debug information (DWARF) found in {}. Locations will be reported as ??:?.",
                path.display()
            );
        }

        let symbols = load_symbol_table(&obj);
        debug!("Loaded {} symbols from the symbol table", symbols.symbols().len());

        Ok(Self {
            context,
            symbols,
            address_width: if obj.is_64() { 16 } else { 8 },
        })
    }

    /// Resolve a single address
    pub fn lookup(&self, address: u64) -> Result<SymbolInfo, SymbolError> {
        let mut frames = self.context.find_frames(address).skip_all_loads()?;

        let mut resolved: Vec<(Option<String>, String)> = Vec::new();
        while let Some(frame) = frames.next()? {
            // Raw names, like addr2line without -C
            let function = frame
                .function
                .as_ref()
                .and_then(|f| f.raw_name().ok().map(|name| name.into_owned()));
            resolved.push((function, format_location(frame.location.as_ref())));
        }

        let mut resolved = resolved
            .into_iter()
            .map(|(f, l)| (f.unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()), l));
        let (function, location) = match resolved.next() {
            Some((f, l)) if f != UNKNOWN_SYMBOL => (f, l),
            Some((_, l)) => (self.symbol_name(address), l),
            None => (self.symbol_name(address), format_location(None)),
        };
        let inlined_chain = resolved.flat_map(|(f, l)| [f, l]).collect();

        Ok(SymbolInfo {
            pc: format!("0x{:0width$x}", address, width = self.address_width),
            function,
            location,
            inlined_chain,
        })
    }

    /// Name of the symbol-table entry covering `address`, or `??`
    fn symbol_name(&self, address: u64) -> String {
        self.symbols
            .get(address)
            .filter(|symbol| symbol.covers(address))
            .map_or_else(|| UNKNOWN_SYMBOL.to_string(), |symbol| symbol.name.clone())
    }
}

/// Defined text and untyped symbols, the ones addr2line can name a pc with
fn load_symbol_table(obj: &object::File<'_>) -> SymbolMap<TableSymbol> {
    let symbols = obj
        .symbols()
        .filter(|symbol| symbol.is_definition())
        .filter(|symbol| matches!(symbol.kind(), SymbolKind::Text | SymbolKind::Unknown))
        .filter_map(|symbol| {
            let name = symbol.name().ok().filter(|name| !name.is_empty())?;
            Some(TableSymbol {
                address: symbol.address(),
                size: symbol.size(),
                name: name.to_string(),
            })
        })
        .collect();
    SymbolMap::new(symbols)
}

impl SymbolResolver for DwarfResolver {
    fn resolve_batch(&mut self, pcs: &[String]) -> Result<Vec<SymbolInfo>, SymbolError> {
        let mut infos = Vec::with_capacity(pcs.len());
        for pc in pcs {
            infos.push(self.lookup(parse_pc(pc)?)?);
        }
        check_count(pcs.len(), infos.len())?;
        Ok(infos)
    }
}

/// `file:line` the way addr2line prints it
fn format_location(location: Option<&addr2line::Location<'_>>) -> String {
    match location {
        Some(loc) => format!(
            "{}:{}",
            loc.file.unwrap_or(UNKNOWN_SYMBOL),
            loc.line
                .filter(|&line| line != 0)
                .map_or_else(|| "?".to_string(), |line| line.to_string())
        ),
        None => format!("{}:?", UNKNOWN_SYMBOL),
    }
}
