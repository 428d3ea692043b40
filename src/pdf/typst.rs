use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::debug;

use crate::error::{DairyError, Result};
use crate::invoice::InvoiceDocument;

/// A4 monthly invoice. `DATA_JSON_PATH` is swapped for the data file.
const INVOICE_TEMPLATE: &str = r##"// Monthly Invoice Template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  margin: (top: 0.6in, bottom: 0.6in, left: 0.6in, right: 0.6in),
)

#set text(font: "Helvetica", size: 10pt)

#let money(amount) = data.currency_symbol + amount

// Letterhead
#align(center)[
  #text(size: 20pt, weight: "bold")[#data.dairy.name]
  #v(0.2em)
  #data.dairy.address | Phone: #data.dairy.phone
  #if data.dairy.gst != none [ | GST: #data.dairy.gst ]
]

#v(1em)
#align(center)[#text(size: 16pt, weight: "bold")[#underline[INVOICE]]]
#v(1em)

// Customer block
#table(
  columns: (auto, auto),
  stroke: none,
  inset: 2pt,
  [*Invoice For:*], [#data.customer.name],
  [*Phone:*], [#data.customer.phone],
  [*Month:*], [#data.month],
  [*Date:*], [#data.date],
)

#v(1em)

// Line items table
#table(
  columns: (auto, 1fr, auto, auto, auto),
  align: (center, left, center, center, center),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else if y > 0 { (bottom: 0.5pt + gray) },
  inset: 8pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  // Header
  [*S.No*], [*Item*], [*Qty*], [*Rate*], [*Amount*],

  // Rows
  ..data.rows.map(row => (
    str(row.sno),
    if "remarks" in row [#row.item (#row.remarks)] else [#row.item],
    row.qty,
    row.rate,
    row.amount,
  )).flatten()
)

#v(1em)

// Summary
#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,

    [Subtotal:], [#money(data.summary.subtotal)],
    [*Total:*], [*#money(data.summary.total)*],
    [Received Amount:], [#money(data.summary.received)],
    table.hline(stroke: 1pt),
    [*Invoice Balance:*], [*#money(data.summary.balance)*],
  )
]

#v(0.5em)
#text(weight: "bold")[Total Amount in Words:] #data.summary.total_in_words

#v(2em)
#align(right)[Thank you for your business!]
#v(4em)
#align(right)[Authorized Signatory]
"##;

/// Scratch directory holding the template and its data for one render.
/// Each render gets its own uniquely named directory, removed on drop.
struct Staging {
    dir: TempDir,
}

impl Staging {
    fn new(doc: &InvoiceDocument) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("dairy-invoice-{}-", doc.month))
            .tempdir()?;
        let staging = Self { dir };

        let data =
            serde_json::to_string(doc).map_err(|e| DairyError::PdfGeneration(e.to_string()))?;
        fs::write(staging.root().join("data.json"), data)?;
        // Path is relative so typst resolves it inside --root.
        fs::write(
            staging.template(),
            INVOICE_TEMPLATE.replace("DATA_JSON_PATH", "data.json"),
        )?;
        Ok(staging)
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn template(&self) -> PathBuf {
        self.root().join("invoice.typ")
    }
}

fn typst_available() -> bool {
    Command::new("typst").arg("--version").output().is_ok()
}

/// Render an invoice document to PDF with the `typst` binary.
pub fn render_invoice(doc: &InvoiceDocument, output_path: &Path) -> Result<()> {
    if !typst_available() {
        return Err(DairyError::TypstNotFound);
    }

    let staging = Staging::new(doc)?;
    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(staging.root())
        .arg(staging.template())
        .arg(output_path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DairyError::PdfGeneration(stderr.trim().to_string()));
    }

    debug!(path = %output_path.display(), "invoice rendered");
    Ok(())
}
