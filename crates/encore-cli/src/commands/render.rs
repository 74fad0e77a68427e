//! `encore render`

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use encore_core::blocks::parse_blocks;
use encore_core::render::{plain_text, render_embed, render_html};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// JSON file holding a block array (stdin when omitted)
    pub file: Option<PathBuf>,

    /// Treat the content as trusted embed markup and re-create its scripts
    #[arg(long, conflicts_with = "text")]
    pub embed: bool,

    /// Print plain text instead of HTML
    #[arg(long)]
    pub text: bool,
}

pub fn run(args: RenderArgs) -> Result<ExitCode> {
    let input = match &args.file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    println!("{}", render_input(&input, &args)?);
    Ok(ExitCode::SUCCESS)
}

fn render_input(input: &str, args: &RenderArgs) -> Result<String> {
    let value: Value = serde_json::from_str(input).context("parsing block JSON")?;
    let blocks = parse_blocks(&value);

    Ok(if args.embed {
        render_embed(&blocks).to_html()
    } else if args.text {
        plain_text(&blocks)
    } else {
        render_html(&blocks)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(embed: bool, text: bool) -> RenderArgs {
        RenderArgs {
            file: None,
            embed,
            text,
        }
    }

    const BODY: &str = r#"[
        {"type": "paragraph", "children": [{"type": "text", "text": "Doors ", "bold": true}, {"type": "text", "text": "at 9"}]},
        {"type": "paragraph", "children": [{"type": "text", "text": ""}]}
    ]"#;

    #[test]
    fn test_render_html() {
        let html = render_input(BODY, &args(false, false)).unwrap();
        assert!(html.contains("<strong>Doors </strong>"));
        assert!(html.contains("<br>"));
    }

    #[test]
    fn test_render_text() {
        assert_eq!(render_input(BODY, &args(false, true)).unwrap(), "Doors at 9\n");
    }

    #[test]
    fn test_render_embed() {
        let body = r#"[{"type": "paragraph", "children": [{"type": "text", "text": "<div id=\"w\"></div><script src=\"https://w.example/x.js\"></script>"}]}]"#;
        let html = render_input(body, &args(true, false)).unwrap();
        assert!(html.starts_with("<div id=\"w\"></div>"));
        assert!(html.contains("<script src=\"https://w.example/x.js\"></script>"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(render_input("{not json", &args(false, false)).is_err());
    }
}
