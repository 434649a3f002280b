//! HTML table rendering

use crate::pipeline::ReportTable;
use crate::{Error, Result};
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "memoryUsage.html";

// Names ending in `.html` are autoescaped by tera.
const TABLE_TEMPLATE: &str = r#"<table border="1" class="dataframe">
  <thead>
    <tr style="text-align: right;">
      <th></th>
{%- for column in header %}
      <th>{{ column }}</th>
{%- endfor %}
    </tr>
  </thead>
  <tbody>
{%- for row in rows %}
    <tr>
      <th>{{ loop.index0 }}</th>
{%- for cell in row %}
      <td>{{ cell }}</td>
{%- endfor %}
    </tr>
{%- endfor %}
  </tbody>
</table>
"#;

/// Render the report as an HTML table with a leading row-number column
///
/// # Errors
/// Returns [`Error::Render`] if the template fails to render
pub fn render_html(table: &ReportTable) -> Result<String> {
    let mut engine = Tera::default();
    engine
        .add_raw_template(TEMPLATE_NAME, TABLE_TEMPLATE)
        .map_err(|e| Error::Render(format!("html template: {e}")))?;

    let mut context = Context::new();
    context.insert("header", table.header());
    context.insert("rows", &table.cell_rows());

    engine
        .render(TEMPLATE_NAME, &context)
        .map_err(|e| Error::Render(format!("html table: {e}")))
}
