//! Result panel
//!
//! Maps a verdict onto the storefront's three display states and hands it to
//! a [`Renderer`]. The widget never touches the page itself; whoever embeds
//! it supplies the renderer.

use crate::verdict::{CompatibilityVerdict, VerdictSource, VerdictStatus};
use serde::Serialize;
use std::fmt::Write;

pub const CONTACT_PATH: &str = "/pages/contact";
pub const CATALOGUE_PATH: &str = "/collections/all";

/// Display sink for analysis results.
pub trait Renderer {
    fn render(&mut self, verdict: &CompatibilityVerdict);
    fn render_error(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallToAction {
    pub label: String,
    pub href: String,
    pub secondary: bool,
}

/// Everything a renderer needs to draw one result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub css_class: &'static str,
    pub title: &'static str,
    pub color: &'static str,
    pub kits: Vec<String>,
    pub note: String,
    pub cta: Option<CallToAction>,
    pub source_label: Option<&'static str>,
}

pub fn status_color(status: VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Compatible => "#10b981",
        VerdictStatus::Unknown => "#f59e0b",
        VerdictStatus::Incompatible => "#ef4444",
    }
}

pub fn source_label(source: VerdictSource) -> &'static str {
    match source {
        VerdictSource::StaticTable => "Source : base de référence Reebike",
        VerdictSource::RuleEngine => "Source : analyse de la géométrie du cadre",
        VerdictSource::RemoteService => "Source : service de compatibilité",
    }
}

impl Panel {
    pub fn from_verdict(verdict: &CompatibilityVerdict) -> Self {
        let status = verdict.status();
        let (css_class, title, cta) = match status {
            VerdictStatus::Compatible => (
                "result-compatible",
                "Vélo compatible !",
                verdict.recommendation_url().map(|href| CallToAction {
                    label: "Voir les kits compatibles".to_string(),
                    href,
                    secondary: false,
                }),
            ),
            VerdictStatus::Unknown => (
                "result-unknown",
                "Vérification nécessaire",
                Some(CallToAction {
                    label: "Contacter notre équipe".to_string(),
                    href: CONTACT_PATH.to_string(),
                    secondary: true,
                }),
            ),
            VerdictStatus::Incompatible => (
                "result-incompatible",
                "Vélo non compatible",
                Some(CallToAction {
                    label: "Voir nos autres solutions".to_string(),
                    href: CATALOGUE_PATH.to_string(),
                    secondary: false,
                }),
            ),
        };

        Self {
            css_class,
            title,
            color: status_color(status),
            kits: verdict.kits().iter().map(|k| k.to_string()).collect(),
            note: verdict.note().to_string(),
            cta,
            source_label: Some(source_label(verdict.source())),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            css_class: "result-incompatible",
            title: "Erreur",
            color: status_color(VerdictStatus::Incompatible),
            kits: Vec::new(),
            note: message.to_string(),
            cta: None,
            source_label: None,
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the panel as the HTML fragment the storefront theme styles.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    html: String,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    fn draw(&mut self, panel: &Panel) {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<div class="{}"><div class="result-header" style="color: {}"><h3 class="result-title">{}</h3></div>"#,
            panel.css_class,
            panel.color,
            escape_html(panel.title)
        );
        if !panel.kits.is_empty() {
            out.push_str(r#"<div class="result-kits"><strong>Kits compatibles :</strong><br>"#);
            for kit in &panel.kits {
                let _ = write!(out, r#"<span class="kit-badge">{}</span>"#, escape_html(kit));
            }
            out.push_str("</div>");
        }
        let _ = write!(out, r#"<div class="result-notes">{}</div>"#, escape_html(&panel.note));
        if let Some(cta) = &panel.cta {
            let class = if cta.secondary { "result-cta secondary" } else { "result-cta" };
            let _ = write!(
                out,
                r#"<a href="{}" class="{}">{}</a>"#,
                escape_html(&cta.href),
                class,
                escape_html(&cta.label)
            );
        }
        if let Some(source) = panel.source_label {
            let _ = write!(out, r#"<div class="result-source">{}</div>"#, escape_html(source));
        }
        out.push_str("</div>");
        self.html = out;
    }
}

impl Renderer for HtmlRenderer {
    fn render(&mut self, verdict: &CompatibilityVerdict) {
        self.draw(&Panel::from_verdict(verdict));
    }

    fn render_error(&mut self, message: &str) {
        self.draw(&Panel::error(message));
    }
}

/// Plain-text panel for terminals.
#[derive(Debug, Default)]
pub struct TextRenderer {
    text: String,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn draw(&mut self, panel: &Panel) {
        let mut out = String::new();
        let _ = writeln!(out, "{}", panel.title);
        if !panel.kits.is_empty() {
            let _ = writeln!(out, "Kits compatibles : {}", panel.kits.join(", "));
        }
        let _ = writeln!(out, "{}", panel.note);
        if let Some(cta) = &panel.cta {
            let _ = writeln!(out, "{} → {}", cta.label, cta.href);
        }
        if let Some(source) = panel.source_label {
            let _ = writeln!(out, "{}", source);
        }
        self.text = out;
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, verdict: &CompatibilityVerdict) {
        self.draw(&Panel::from_verdict(verdict));
    }

    fn render_error(&mut self, message: &str) {
        self.draw(&Panel::error(message));
    }
}
