//! `strata inspect`: show how the generator reads names and column types.

use serde::Serialize;

use strata_core::domain::{
    DatabaseEngine, Identifier, TypeMapper, TypeResolution, naming::IdentifierCases,
};

use crate::{
    cli::{InspectCommands, OutputFormat},
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NameReport<'a> {
    input: &'a str,
    #[serde(flatten)]
    cases: IdentifierCases,
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypeReport<'a> {
    input: &'a str,
    storage: String,
    transport: &'static str,
    display: &'static str,
    /// `None` when no rule matched and the default applied.
    rule: Option<usize>,
    needle: Option<&'static str>,
}

pub fn execute(cmd: InspectCommands, output: OutputManager) -> CliResult<()> {
    let json = output.format() == OutputFormat::Json;
    match cmd {
        InspectCommands::Name { names } => {
            let reports: Vec<NameReport<'_>> = names.iter().map(|n| name_report(n)).collect();
            if json {
                return output.json(&reports);
            }
            for report in &reports {
                output.header(&format!("{}:", report.input))?;
                output.print(&format!("  UpperCamel  {}", report.cases.upper_camel))?;
                output.print(&format!("  lowerCamel  {}", report.cases.lower_camel))?;
                output.print(&format!("  kebab       {}", report.cases.kebab))?;
                output.print(&format!("  snake       {}", report.cases.snake))?;
                output.print(&format!("  title       {}", report.title))?;
            }
        }

        InspectCommands::Type { types, database } => {
            let engine = DatabaseEngine::from(database);
            let reports: Vec<TypeReport<'_>> =
                types.iter().map(|t| type_report(t, &engine)).collect();
            if json {
                return output.json(&reports);
            }
            output.detail(&format!("engine: {engine}"))?;
            for report in &reports {
                output.print(&format!(
                    "  {:<20} {:<28} {:<8} {:<15} {}",
                    report.input,
                    report.storage,
                    report.transport,
                    report.display,
                    rule_label(report),
                ))?;
                if report.rule.is_none() {
                    output.warning(&format!(
                        "'{}' matched no rule; it is stored as a string",
                        report.input
                    ))?;
                }
            }
        }
    }
    Ok(())
}

fn name_report(raw: &str) -> NameReport<'_> {
    let ident = Identifier::parse(raw);
    NameReport {
        input: raw,
        cases: ident.cases(),
        title: ident.title(),
    }
}

fn type_report<'a>(raw: &'a str, engine: &DatabaseEngine) -> TypeReport<'a> {
    let TypeResolution { mapping, rule } = TypeMapper::resolve(raw);
    TypeReport {
        input: raw,
        storage: mapping.storage.render(engine),
        transport: mapping.transport.as_str(),
        display: mapping.display.as_str(),
        rule: rule.map(|hit| hit.rule.number),
        needle: rule.map(|hit| hit.needle),
    }
}

fn rule_label(report: &TypeReport<'_>) -> String {
    match (report.rule, report.needle) {
        (Some(number), Some(needle)) => format!("rule {number} ({needle})"),
        _ => "default".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_render_every_case() {
        let report = name_report("unit_price");
        assert_eq!(report.cases.upper_camel, "UnitPrice");
        assert_eq!(report.cases.lower_camel, "unitPrice");
        assert_eq!(report.cases.kebab, "unit-price");
        assert_eq!(report.title, "Unit Price");
    }

    #[test]
    fn name_report_flattens_cases_in_json() {
        let value = serde_json::to_value(name_report("InvoiceLine")).unwrap();
        assert_eq!(value["input"], "InvoiceLine");
        assert_eq!(value["snake"], "invoice_line");
        assert_eq!(value["title"], "Invoice Line");
    }

    #[test]
    fn type_report_names_the_rule() {
        let report = type_report("decimal(10,2)", &DatabaseEngine::Postgres);
        assert_eq!(report.storage, "Decimal @db.Decimal(12, 2)");
        assert_eq!(report.transport, "string");
        assert_eq!(rule_label(&report), "rule 6 (decimal)");
    }

    #[test]
    fn unmatched_type_uses_default() {
        let report = type_report("geometry", &DatabaseEngine::Sqlite);
        assert_eq!(report.rule, None);
        assert_eq!(report.storage, "String");
        assert_eq!(rule_label(&report), "default");
    }
}
