/// Insert formulas into a Word document body.
///
/// This example demonstrates:
/// - Inline and display formulas from MathML
/// - LaTeX input converted through MathML (feature `latex`)
/// - Writing the resulting `word/document.xml` part
///
/// Pass an output path to write the part to a file; otherwise it is printed.
use formulary::document::Document;
use formulary::{DisplayMode, Format, Formula, TransformRegistry};
use std::env;
use std::fs;

const FRACTION: &str =
    r#"<math xmlns="http://www.w3.org/1998/Math/MathML"><mfrac><mn>1</mn><mn>2</mn></mfrac></math>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = env::args().nth(1);
    let registry = TransformRegistry::with_defaults();

    println!("Registered converters:");
    for key in registry.keys() {
        println!("  {}", key);
    }
    println!();

    let mut doc = Document::new();

    // Inline formula after some text
    let para = doc.add_paragraph_with_text("Text ... Text ");
    let mut inline = Formula::new(FRACTION, DisplayMode::Inline)?;
    inline.add_to(&registry, para)?;

    // The same formula on its own line, in an existing paragraph
    doc.add_paragraph();
    let mut block = Formula::with_format(FRACTION, Format::MathML, DisplayMode::Block)?;
    if let Some(para) = doc.paragraphs_mut().last_mut() {
        block.add_to(&registry, para)?;
    }

    // A display formula in a paragraph of its own
    block.add_to(&registry, &mut doc)?;

    #[cfg(feature = "latex")]
    {
        let mut latex = Formula::new(r"\sum_{i=1}^{n} i = \frac{n(n+1)}{2}", DisplayMode::Block)?;
        latex.add_to(&registry, &mut doc)?;
        println!("Derived formats for LaTeX input: {:?}", latex.available_formats());
    }

    println!("Paragraphs: {}", doc.paragraph_count());
    let xml = doc.to_xml();
    match output {
        Some(path) => {
            fs::write(&path, &xml)?;
            println!("✓ Wrote {}", path);
        },
        None => println!("{}", xml),
    }
    Ok(())
}
