use std::collections::HashMap;

/// Built-in display name → exchange symbol table for common holdings.
const BUILTIN_SYMBOLS: &[(&str, &str)] = &[
    ("HDFC Bank", "HDFCBANK.NS"),
    ("ICICI Bank", "ICICIBANK.NS"),
    ("State Bank of India", "SBIN.NS"),
    ("Bajaj Finance", "BAJFINANCE.NS"),
    ("Bajaj Housing", "BAJAJHFL.NS"),
    ("Savani Financials", "511577.BO"),
    ("SBI Life", "SBILIFE.NS"),
    ("TCS", "TCS.NS"),
    ("Tata Consultancy Services", "TCS.NS"),
    ("Infosys", "INFY.NS"),
    ("Affle India", "AFFLE.NS"),
    ("LTI Mindtree", "LTIM.NS"),
    ("KPIT Tech", "KPITTECH.NS"),
    ("Tata Tech", "TATATECH.NS"),
    ("BLS E-Services", "BLSE.NS"),
    ("Tanla", "TANLA.NS"),
    ("Happiest Minds", "HAPPSTMNDS.NS"),
    ("Easemytrip", "EASEMYTRIP.NS"),
    ("Dmart", "DMART.NS"),
    ("Tata Consumer", "TATACONSUM.NS"),
    ("Pidilite", "PIDILITIND.NS"),
    ("Tata Power", "TATAPOWER.NS"),
    ("KPI Green", "KPIGREEN.NS"),
    ("Suzlon", "SUZLON.NS"),
    ("Gensol", "GENSOL.NS"),
    ("Hariom Pipes", "HARIOMPIPE.NS"),
    ("Astral", "ASTRAL.NS"),
    ("Polycab", "POLYCAB.NS"),
    ("Clean Science", "CLEAN.NS"),
    ("Deepak Nitrite", "DEEPAKNTR.NS"),
    ("Fine Organic", "FINEORG.NS"),
    ("Gravita", "GRAVITA.NS"),
    ("Reliance Industries", "RELIANCE.NS"),
];

/// Built-in display name → sector table.
const BUILTIN_SECTORS: &[(&str, &str)] = &[
    ("HDFC Bank", "Financial Sector"),
    ("ICICI Bank", "Financial Sector"),
    ("State Bank of India", "Financial Sector"),
    ("Bajaj Finance", "Financial Sector"),
    ("Bajaj Housing", "Financial Sector"),
    ("Savani Financials", "Financial Sector"),
    ("SBI Life", "Financial Sector"),
    ("TCS", "Tech Sector"),
    ("Tata Consultancy Services", "Tech Sector"),
    ("Infosys", "Tech Sector"),
    ("Affle India", "Tech Sector"),
    ("LTI Mindtree", "Tech Sector"),
    ("KPIT Tech", "Tech Sector"),
    ("Tata Tech", "Tech Sector"),
    ("BLS E-Services", "Tech Sector"),
    ("Tanla", "Tech Sector"),
    ("Happiest Minds", "Tech Sector"),
    ("Easemytrip", "Consumer"),
    ("Dmart", "Consumer"),
    ("Tata Consumer", "Consumer"),
    ("Pidilite", "Consumer"),
    ("Tata Power", "Power"),
    ("KPI Green", "Power"),
    ("Suzlon", "Power"),
    ("Gensol", "Power"),
    ("Hariom Pipes", "Pipe Sector"),
    ("Astral", "Pipe Sector"),
    ("Polycab", "Pipe Sector"),
    ("Clean Science", "Chemicals"),
    ("Deepak Nitrite", "Chemicals"),
    ("Fine Organic", "Chemicals"),
    ("Gravita", "Others"),
    ("Reliance Industries", "Energy"),
];

/// Uppercase and drop all whitespace: `"Tata  power "` → `"TATAPOWER"`.
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Static reference tables used by symbol resolution and sector assignment.
///
/// Each table is held twice: keyed by the exact display name, and keyed by
/// [`normalize_key`] for the case/whitespace-insensitive fallback.
#[derive(Debug, Clone)]
pub struct LookupTables {
    symbols: HashMap<String, String>,
    symbols_normalized: HashMap<String, String>,
    sectors: HashMap<String, String>,
    sectors_normalized: HashMap<String, String>,
}

impl LookupTables {
    /// Empty tables (every lookup misses).
    pub fn empty() -> Self {
        Self {
            symbols: HashMap::new(),
            symbols_normalized: HashMap::new(),
            sectors: HashMap::new(),
            sectors_normalized: HashMap::new(),
        }
    }

    /// Tables pre-filled with the built-in entries.
    pub fn builtin() -> Self {
        let mut tables = Self::empty();
        for (name, symbol) in BUILTIN_SYMBOLS {
            tables.add_symbol(name, symbol);
        }
        for (name, sector) in BUILTIN_SECTORS {
            tables.add_sector(name, sector);
        }
        tables
    }

    /// Merge extra entries over the current ones (later entries win).
    pub fn with_entries(
        mut self,
        symbols: &HashMap<String, String>,
        sectors: &HashMap<String, String>,
    ) -> Self {
        for (name, symbol) in symbols {
            self.add_symbol(name, symbol);
        }
        for (key, sector) in sectors {
            self.add_sector(key, sector);
        }
        self
    }

    pub fn add_symbol(&mut self, name: &str, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        self.symbols.insert(name.to_string(), symbol.clone());
        self.symbols_normalized.insert(normalize_key(name), symbol);
    }

    /// `key` may be a display name or an exchange symbol.
    pub fn add_sector(&mut self, key: &str, sector: &str) {
        let sector = sector.trim().to_string();
        self.sectors.insert(key.to_string(), sector.clone());
        self.sectors_normalized.insert(normalize_key(key), sector);
    }

    /// Exact display-name lookup.
    pub fn symbol_exact(&self, name: &str) -> Option<&str> {
        self.symbols.get(name).map(String::as_str)
    }

    /// Case- and whitespace-insensitive display-name lookup.
    pub fn symbol_normalized(&self, name: &str) -> Option<&str> {
        self.symbols_normalized
            .get(&normalize_key(name))
            .map(String::as_str)
    }

    /// Sector by display name (exact, then normalized), then by symbol.
    pub fn sector_for(&self, name: Option<&str>, symbol: Option<&str>) -> Option<&str> {
        let by_name = name.and_then(|n| {
            self.sectors
                .get(n)
                .or_else(|| self.sectors_normalized.get(&normalize_key(n)))
        });
        by_name
            .or_else(|| symbol.and_then(|s| self.sectors_normalized.get(&normalize_key(s))))
            .map(String::as_str)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}

impl Default for LookupTables {
    fn default() -> Self {
        Self::builtin()
    }
}
