//! Three panels in an accordion, driven by simulated clicks and resizes.
//!
//! ```sh
//! cargo run -p rvbutton --example accordion
//! ```

use std::sync::Arc;
use std::time::Duration;

use rvbutton::prelude::*;
use rvdom::{Display, Edges};
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};

const SECTIONS: [&str; 3] = ["shipping", "returns", "warranty"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    TermLogger::init(
        LevelFilter::Debug,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let doc = Arc::new(Document::new(1280));
    for (i, name) in SECTIONS.iter().enumerate() {
        doc.mount(
            doc.body(),
            Element::link()
                .id(format!("{name}-toggle"))
                .attr("href", format!("#{name}")),
        )?;
        doc.mount(
            doc.body(),
            Element::div()
                .id(format!("{name}-body"))
                .content_height(60.0 + 40.0 * i as f32)
                .padding(Edges::all(8.0)),
        )?;
    }

    let config = Config::from_json(
        r#"{
            "duration": 300,
            "icon": { "position": "after", "open": "−", "close": "+" },
            "responsive": { "640": { "isOpen": true, "isActive": false } }
        }"#,
    )?
    .on(Notify::AfterOpen, || log::info!("a section finished opening"));

    let selectors: Vec<(String, String)> = SECTIONS
        .iter()
        .map(|name| (format!("#{name}-toggle"), format!("#{name}-body")))
        .collect();
    let buttons = RvButton::create(
        doc.clone(),
        selectors.iter().map(|(t, c)| (t.as_str(), c.as_str())),
        config,
    )?;
    let group = RvGroup::new(buttons);

    for name in SECTIONS.iter().cycle().take(4) {
        let Some(trigger) = doc.get_element_by_id(&format!("{name}-toggle")) else {
            continue;
        };
        log::info!("click {name}");
        doc.click(trigger)?;
        tokio::time::sleep(Duration::from_millis(400)).await;
        report(&doc, &group)?;
    }

    log::info!("narrow viewport");
    doc.resize(480);
    report(&doc, &group)?;

    log::info!("wide viewport");
    doc.resize(1280);
    report(&doc, &group)?;
    Ok(())
}

fn report(doc: &Document, group: &RvGroup) -> Result<(), rvdom::DomError> {
    for (name, button) in SECTIONS.iter().zip(group.buttons()) {
        let panel = button.contents()[0];
        let shown = doc.computed_display(panel)? != Display::None;
        log::info!(
            "  {:<9} open={:<5} active={:<5} shown={:<5} height={}",
            name,
            button.is_open(),
            button.is_active(),
            shown,
            doc.offset_height(panel)?
        );
    }
    Ok(())
}
