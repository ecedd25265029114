//! Fixed-layout parsing of the Detran results table.
//!
//! The consultation answer is a table with five rows and a known cell
//! geometry; each cell carries a `Label:` prefix ahead of the value.
//! Label stripping is forgiving (a missing prefix leaves the text as-is)
//! and missing cells become empty strings, but a missing table means the
//! page did not come back in the expected shape and is a hard error.

use crate::types::FineRecord;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page does not contain the results table at all.
    #[error("results table not found in page")]
    TableMissing,
}

const TABLE_SELECTOR: &str = "#conteudoConsulta table";

/// Parse the frame's HTML into a [`FineRecord`].
///
/// Never returns a partial record dressed up as a complete one: either the
/// table is present and every field is filled (possibly with an empty
/// string), or extraction fails outright.
pub fn extract_fine_record(html: &str) -> Result<FineRecord, ExtractError> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse(TABLE_SELECTOR).unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();

    let table = document
        .select(&table_sel)
        .next()
        .ok_or(ExtractError::TableMissing)?;

    let rows: Vec<ElementRef> = table.select(&row_sel).collect();
    let cell = |row: usize, col: usize, label: &str| -> String {
        rows.get(row)
            .and_then(|r| r.select(&cell_sel).nth(col))
            .map(|c| strip_label(&c.text().collect::<String>(), label))
            .unwrap_or_default()
    };

    Ok(FineRecord {
        auto_infracao: cell(0, 0, "Auto de Infração:"),
        renainf: cell(0, 1, "RENAINF:"),
        data_pagamento_desconto: cell(0, 2, "Data Pgto. com Desconto:"),
        classificacao: cell(1, 0, "Classificação:"),
        data_hora: cell(1, 1, "Data/Hora:"),
        descricao: cell(2, 0, "Descrição:"),
        placa_relacionada: cell(2, 1, "Placa Relacionada:"),
        local: cell(3, 0, "Local:"),
        valor_original: cell(3, 1, "Valor Original:"),
        valor_pago: cell(3, 2, "Valor Pago:"),
        status_pagamento: cell(4, 0, "Situação do Pagamento:"),
        orgao_emissor: cell(4, 1, "Órgão Emissor:"),
        agente_emissor: cell(4, 2, "Agente Emissor:"),
    })
}

/// Drop the known label prefix when present, then trim whitespace.
fn strip_label(raw: &str, label: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_prefix(label) {
        Some(rest) => rest.trim().to_string(),
        None => trimmed.to_string(),
    }
}
