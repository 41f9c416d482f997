// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

pub const DEFAULT_LANG: &str = "en";

// (key, english, bahasa indonesia)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("validation_failed", "One or more parameters are invalid.", "Satu atau lebih parameter tidak valid."),
    ("report_not_found", "Report not found.", "Laporan tidak ditemukan."),
    ("location_not_found", "Location is not part of the PUMA footprint.", "Lokasi tidak termasuk wilayah PUMA."),
    ("required", "This parameter is required.", "Parameter ini wajib diisi."),
    ("internal_error", "An unexpected error occurred.", "Terjadi kesalahan yang tidak terduga."),
    ("database_unavailable", "The reporting database is unavailable.", "Basis data laporan tidak tersedia."),
    ("invalid_date", "Date must use the YYYY-MM-DD format.", "Tanggal harus berformat YYYY-MM-DD."),
    ("date_in_future", "Date cannot be in the future.", "Tanggal tidak boleh melewati hari ini."),
    ("unknown_location", "Unknown location for this level.", "Lokasi tidak dikenal untuk level ini."),
    ("filter_mismatch", "Location is outside the selected parent area.", "Lokasi berada di luar area induk yang dipilih."),
    ("invalid_view", "View must be 'tree' or 'flat'.", "Tampilan harus 'tree' atau 'flat'."),
];

/// Translated messages by language, then key.
#[derive(Clone, Debug)]
pub struct I18nStore {
    messages: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut en = HashMap::new();
        let mut id = HashMap::new();
        for (key, english, indonesian) in MESSAGES {
            en.insert(*key, *english);
            id.insert(*key, *indonesian);
        }

        let mut messages = HashMap::new();
        messages.insert("en", en);
        messages.insert("id", id);

        Self { messages: Arc::new(messages) }
    }

    /// Falls back to English, then to the key itself.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|table| table.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|table| table.get(key)))
            .map(|message| message.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_with_fallbacks() {
        let store = I18nStore::new();
        assert_eq!(store.translate("id", "report_not_found"), "Laporan tidak ditemukan.");
        assert_eq!(store.translate("en", "report_not_found"), "Report not found.");
        assert_eq!(store.translate("pt", "report_not_found"), "Report not found.");
        assert_eq!(store.translate("id", "no_such_key"), "no_such_key");
    }
}
