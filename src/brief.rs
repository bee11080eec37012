//! Impact briefs: one or two sentences on why an item matters to broadcast
//! engineers.
//!
//! The pipeline only depends on [`BriefGenerator`]. [`RuleBasedBrief`] is a
//! deterministic keyword template; a generative backend can implement the
//! same trait without touching the pipeline.

/// Produces the `impactBrief` text for an item.
pub trait BriefGenerator {
    fn brief(&self, title: &str, description: &str, category: &str) -> String;
}

/// Category sentence plus at most one keyword-triggered addendum.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedBrief;

const GENERIC_BASE: &str = "Relevant to broadcast engineering workflows. ";

const GENERIC_IMPACT: &str = "Represents an important development in broadcast technology.";

/// Base sentence per built-in category.
const CATEGORY_BASES: &[(&str, &str)] = &[
    ("newsroom", "Impacts newsroom workflow efficiency and content management systems. "),
    ("playout", "Affects broadcast automation and master control operations. "),
    ("infrastructure", "Influences IP video transport and signal routing architecture. "),
    ("graphics", "Shapes real-time graphics rendering and broadcast design workflows. "),
    ("cloud", "Transforms remote collaboration and cloud-based editing capabilities. "),
    ("streaming", "Alters OTT delivery infrastructure and content distribution strategies. "),
    ("audio-ai", "Impacts audio processing workflows and AI-driven automation systems. "),
];

/// Keyword groups in priority order; the first group with a hit supplies the
/// addendum.
const KEYWORD_IMPACTS: &[(&[&str], &str)] = &[
    (&["smpte", "2110", "st 2110", "ip"], "Enables lower latency for ST 2110 workflows."),
    (&["cloud", "remote", "saas"], "Reduces infrastructure costs through cloud scalability."),
    (&["ai", "ml", "automation", "intelligent"], "Automates repetitive tasks with AI-powered intelligence."),
    (&["ndi", "dante", "aes67", "audio"], "Simplifies audio routing in IP-based environments."),
    (&["4k", "8k", "uhd", "hdr"], "Supports higher resolution formats for premium content delivery."),
    (&["integration", "workflow", "interoperability"], "Improves system integration across vendor ecosystems."),
];

impl BriefGenerator for RuleBasedBrief {
    /// Keywords are matched as plain substrings of the lower-cased title, so
    /// "ip" also fires inside words like "ship". The description is not
    /// consulted.
    fn brief(&self, title: &str, _description: &str, category: &str) -> String {
        let title = title.to_lowercase();

        let base = CATEGORY_BASES
            .iter()
            .find(|(name, _)| *name == category)
            .map_or(GENERIC_BASE, |&(_, base)| base);

        let impact = KEYWORD_IMPACTS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| title.contains(*k)))
            .map_or(GENERIC_IMPACT, |&(_, impact)| impact);

        format!("{base}{impact}")
    }
}
