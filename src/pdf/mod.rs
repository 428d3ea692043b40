mod typst;

pub use typst::render_invoice;
