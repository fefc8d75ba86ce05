// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Pipeline variable bridging
//!
//! Values computed in one stage become visible to the orchestrator's later
//! steps through provider marker lines on standard output (Azure DevOps
//! `##vso` logging commands). The same values are mirrored into the local
//! process environment for same-process consumers, and a summary table is
//! printed for log auditability.

use colored::Colorize;
use tracing::debug;

/// Default prefix applied to exported variable names
pub const DEFAULT_VAR_PREFIX: &str = "FLOW_";

/// A variable to export to subsequent pipeline steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineVariable {
    pub name: String,
    pub value: String,
    pub is_secret: bool,
    pub is_output: bool,
}

impl PipelineVariable {
    /// Create a plain (non-secret, non-output) variable
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_secret: false,
            is_output: false,
        }
    }

    /// Mark the variable secret
    pub fn secret(mut self) -> Self {
        self.is_secret = true;
        self
    }

    /// Mark the variable as a stage output
    pub fn output(mut self) -> Self {
        self.is_output = true;
        self
    }

    /// Render the `task.setvariable` marker line
    pub fn set_variable_line(&self) -> String {
        format!(
            "##vso[task.setvariable variable={};isSecret={};isOutput={}]{}",
            self.name, self.is_secret, self.is_output, self.value
        )
    }

    /// Emit the marker line to standard output
    pub fn emit(&self) {
        println!("{}", self.set_variable_line());
    }
}

/// Render the `build.updatebuildnumber` marker line
pub fn update_build_number_line(build_number: &str) -> String {
    format!("##vso[build.updatebuildnumber]{}", build_number)
}

/// Override the build number of the current pipeline run
pub fn update_build_number(build_number: &str) {
    println!("{}", update_build_number_line(build_number));
}

/// Render the `build.addbuildtag` marker line
pub fn add_build_tag_line(tag: &str) -> String {
    format!("##vso[build.addbuildtag]{}", tag)
}

/// Tag the current pipeline run
pub fn add_build_tag(tag: &str) {
    println!("{}", add_build_tag_line(tag));
}

/// One row of the export summary: shell form, template form, value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedVariable {
    pub bash_form: String,
    pub template_form: String,
    pub value: String,
}

/// Export a batch of name/value pairs to subsequent pipeline steps
///
/// Each name is uppercased and prefixed, emitted as a marker line, and set
/// in the local process environment. Returns the summary rows after
/// printing them as a table.
pub fn export_batch(pairs: &[(String, String)], prefix: &str) -> Vec<ExportedVariable> {
    println!("Treat vars in either shell context or pipeline template as listed below:");

    let mut summary = Vec::with_capacity(pairs.len());

    for (name, value) in pairs {
        let exported_name = format!("{}{}", prefix.to_uppercase(), name.to_uppercase());

        PipelineVariable::new(&exported_name, value).emit();
        std::env::set_var(&exported_name, value);
        debug!(name = %exported_name, "exported pipeline variable");

        // Dots are legal in pipeline variable names but not in shell ones.
        let bash_name = exported_name.replace('.', "_");

        summary.push(ExportedVariable {
            bash_form: format!("${}", bash_name),
            template_form: format!("$({})", exported_name),
            value: value.clone(),
        });
    }

    println!("{}", "Summarized envs:".bold());
    println!("{}", render_summary_table(&summary));

    summary
}

/// Render the summary rows as an aligned text table
fn render_summary_table(rows: &[ExportedVariable]) -> String {
    const HEADERS: [&str; 3] = ["Bash", "Pipeline_template", "Value"];

    let mut widths = [HEADERS[0].len(), HEADERS[1].len(), HEADERS[2].len()];
    for row in rows {
        widths[0] = widths[0].max(row.bash_form.len());
        widths[1] = widths[1].max(row.template_form.len());
        widths[2] = widths[2].max(row.value.len());
    }

    let separator = format!(
        "+{}+{}+{}+",
        "-".repeat(widths[0] + 2),
        "-".repeat(widths[1] + 2),
        "-".repeat(widths[2] + 2)
    );

    let mut table = String::new();
    table.push_str(&separator);
    table.push('\n');
    table.push_str(&format!(
        "| {:w0$} | {:w1$} | {:w2$} |\n",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    ));
    table.push_str(&separator);
    table.push('\n');

    for row in rows {
        table.push_str(&format!(
            "| {:w0$} | {:w1$} | {:w2$} |\n",
            row.bash_form,
            row.template_form,
            row.value,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        ));
    }
    table.push_str(&separator);

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_variable_line_format() {
        let var = PipelineVariable::new("FLOW_GIT_COMMIT_ID", "01234567");
        assert_eq!(
            var.set_variable_line(),
            "##vso[task.setvariable variable=FLOW_GIT_COMMIT_ID;isSecret=false;isOutput=false]01234567"
        );
    }

    #[test]
    fn test_secret_output_flags() {
        let var = PipelineVariable::new("TOKEN", "s3cret").secret().output();
        assert_eq!(
            var.set_variable_line(),
            "##vso[task.setvariable variable=TOKEN;isSecret=true;isOutput=true]s3cret"
        );
    }

    #[test]
    fn test_build_number_and_tag_lines() {
        assert_eq!(
            update_build_number_line("20250101.7.01234567"),
            "##vso[build.updatebuildnumber]20250101.7.01234567"
        );
        assert_eq!(
            add_build_tag_line("commit_id=01234567"),
            "##vso[build.addbuildtag]commit_id=01234567"
        );
    }

    #[test]
    fn test_export_batch_prefixes_and_sets_process_env() {
        let pairs = vec![("bridge_probe_dir".to_string(), "/tmp/x".to_string())];
        let summary = export_batch(&pairs, DEFAULT_VAR_PREFIX);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].bash_form, "$FLOW_BRIDGE_PROBE_DIR");
        assert_eq!(summary[0].template_form, "$(FLOW_BRIDGE_PROBE_DIR)");
        assert_eq!(std::env::var("FLOW_BRIDGE_PROBE_DIR").unwrap(), "/tmp/x");
    }

    #[test]
    fn test_dotted_names_get_shell_safe_form() {
        let pairs = vec![("build.output".to_string(), "out".to_string())];
        let summary = export_batch(&pairs, DEFAULT_VAR_PREFIX);

        assert_eq!(summary[0].bash_form, "$FLOW_BUILD_OUTPUT");
        assert_eq!(summary[0].template_form, "$(FLOW_BUILD.OUTPUT)");
    }

    #[test]
    fn test_summary_table_is_aligned() {
        let rows = vec![ExportedVariable {
            bash_form: "$FLOW_A".into(),
            template_form: "$(FLOW_A)".into(),
            value: "v".into(),
        }];
        let table = render_summary_table(&rows);

        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with('+'));
        assert!(lines[1].contains("Bash"));
        assert!(lines[3].contains("$FLOW_A"));
        // Every line in a grid table has the same width.
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }
}
