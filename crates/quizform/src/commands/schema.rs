//! Print the derived form schema

use std::io::Write;

use anyhow::Result;
use itertools::Itertools;
use quizform_core::{Field, FormSchema};

use super::QuizContext;

pub fn run(context: &QuizContext, json: bool, out: &mut impl Write) -> Result<()> {
    let schema = context.schema()?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&schema)?)?;
    } else {
        write_text(&schema, out)?;
    }
    Ok(())
}

fn write_text(schema: &FormSchema, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{} ({})", schema.title(), schema.slug())?;
    if !schema.description().is_empty() {
        writeln!(out, "{}", schema.description())?;
    }

    writeln!(out)?;
    writeln!(out, "Contact")?;
    for field in schema.contact_fields() {
        writeln!(out, "  {}", describe_field(field))?;
    }

    for section in schema.question_sections() {
        writeln!(out)?;
        writeln!(out, "{}. {} [{}]", section.section.order, section.section.title, section.section.slug)?;
        for field in section.fields {
            writeln!(out, "  {}. {} ({})", field.order, field.label, field.id)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Answers: {}",
        schema
            .answer_options()
            .iter()
            .map(|option| format!("{} = {}", option.text, option.value))
            .join(", ")
    )?;

    writeln!(out, "Results:")?;
    for band in schema.result_bands() {
        writeln!(
            out,
            "  {:>3}-{:<3}% {}",
            band.min_percentage, band.max_percentage, band.title
        )?;
    }
    Ok(())
}

fn describe_field(field: &Field) -> String {
    let bounds = match (field.min_length, field.max_length) {
        (Some(min), Some(max)) => format!(" {min}..={max}"),
        (Some(min), None) => format!(" {min}.."),
        (None, Some(max)) => format!(" ..={max}"),
        (None, None) => String::new(),
    };
    let options = if field.options.is_empty() {
        String::new()
    } else {
        format!(" [{}]", field.options.iter().join("|"))
    };
    let required = if field.required { " *" } else { "" };

    format!(
        "{}: {} ({} as {}{bounds}){options}{required}",
        field.id, field.label, field.html_type, field.data_type
    )
}
