use colored::*;

use crate::models::StudyRecord;

/// Terminal rendering of a finished study
pub struct StudyVisual;

impl StudyVisual {
    pub fn display_record(record: &StudyRecord) {
        println!("{}", record.reference.bright_yellow().bold());
        println!("{}\n", record.scripture_text.italic());

        Self::heading("Observation");
        for (i, verse) in record.verse_analysis.iter().enumerate() {
            println!("  {}. {}", (i + 1).to_string().cyan(), verse.segment.bold());
            println!("     {}", verse.insight);
        }

        Self::heading("Interpretation");
        for term in &record.key_terms {
            println!(
                "  {} ({} {}): {}",
                term.word.bold(),
                term.language.as_str().cyan(),
                term.original_word.italic(),
                term.definition
            );
            println!("     {}", term.significance);
        }
        Self::section("Misconceptions", &record.misconceptions);
        Self::section("Cultural context", &record.cultural_context);
        Self::section("Original meaning", &record.original_meaning);
        Self::section("Theological truth", &record.theological_truth);
        if !record.cross_references.is_empty() {
            println!("  {}", "Cross references".bright_cyan());
            for xref in &record.cross_references {
                println!("     {} {}", xref.reference.bold(), xref.connection);
            }
        }

        if !record.complex_terms.is_empty() {
            Self::heading("Glossary");
            for term in &record.complex_terms {
                println!("  {}: {}", term.term.bold(), term.definition);
            }
        }

        Self::heading("Application");
        println!("  {}", record.application);
        println!("\n  {} {}", "🙏".bright_yellow(), record.prayer_point.italic());
    }

    pub fn display_error(message: &str) {
        eprintln!("{} {}", "✗".bright_red(), message.red());
    }

    fn heading(title: &str) {
        println!("\n{}", title.to_uppercase().bright_cyan().bold());
    }

    fn section(title: &str, body: &str) {
        if body.trim().is_empty() {
            return;
        }
        println!("  {}", title.bright_cyan());
        println!("     {}", body);
    }
}
