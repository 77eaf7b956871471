use std::io::{self, Write};

use phishguard_core::{AppViewModel, ModelId, Phase, Theme, Verdict};

/// ANSI colours for one theme. `plain()` disables colour entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    danger: &'static str,
    safe: &'static str,
    muted: &'static str,
    reset: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                danger: "\x1b[31m",
                safe: "\x1b[32m",
                muted: "\x1b[90m",
                reset: "\x1b[0m",
            },
            Theme::Dark => Self {
                danger: "\x1b[91m",
                safe: "\x1b[92m",
                muted: "\x1b[37m",
                reset: "\x1b[0m",
            },
        }
    }

    pub fn plain() -> Self {
        Self {
            danger: "",
            safe: "",
            muted: "",
            reset: "",
        }
    }
}

pub fn render(out: &mut impl Write, view: &AppViewModel, palette: Palette) -> io::Result<()> {
    let p = palette;
    match view.phase {
        Phase::Idle => {}
        Phase::Loading => {
            if let Some(pending) = &view.pending {
                writeln!(
                    out,
                    "{}Analyzing {} with {}...{}",
                    p.muted, pending.url, pending.model_label, p.reset
                )?;
            }
        }
        Phase::Success => {
            if let Some(card) = &view.verdict {
                let colour = match card.verdict {
                    Verdict::Phishing => p.danger,
                    Verdict::Legitimate => p.safe,
                };
                writeln!(out, "{colour}{}{}", card.headline, p.reset)?;
                writeln!(out, "{}", card.summary)?;
                writeln!(out, "  {}", card.url)?;
                if let Some(confidence) = &card.confidence {
                    writeln!(out, "  Confidence Level: {confidence}")?;
                }
                writeln!(out, "{}", card.guidance_title)?;
                for line in card.guidance {
                    writeln!(out, "  - {line}")?;
                }
            }
        }
        Phase::Failed => {
            if let Some(message) = &view.error {
                writeln!(out, "{}Error:{} {message}", p.danger, p.reset)?;
            }
        }
    }
    Ok(())
}

pub fn render_models(out: &mut impl Write, selected: ModelId, palette: Palette) -> io::Result<()> {
    for model in ModelId::ALL {
        let marker = if model == selected { '*' } else { ' ' };
        writeln!(
            out,
            "{marker} {:<3}{:<22}{}{}{}",
            model.as_str(),
            model.label(),
            palette.muted,
            model.description(),
            palette.reset
        )?;
    }
    Ok(())
}
