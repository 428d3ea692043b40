use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub dairy: Dairy,
    #[serde(default)]
    pub invoice: InvoiceSettings,
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub pdf: PdfSettings,
}

/// Invoice letterhead.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Dairy {
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub gst: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceSettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Appended to the total in words, e.g. "Rupees Only".
    #[serde(default = "default_words_suffix")]
    pub words_suffix: String,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            words_suffix: default_words_suffix(),
        }
    }
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_words_suffix() -> String {
    "Rupees Only".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifySettings {
    /// Prefix of the invoice link sent in reminders.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:4000".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreSettings {
    /// Records file; relative paths are resolved against the config directory.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "ledger.toml".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}
