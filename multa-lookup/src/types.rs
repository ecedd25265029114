use serde::{Deserialize, Serialize};

/// One extracted fine, as presented by the Detran results table.
///
/// All fields are plain strings taken from the page; individual cells that
/// were absent come through as empty strings. Serde names match the keys
/// the consultation result is published under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FineRecord {
    pub auto_infracao: String,
    pub renainf: String,
    pub data_pagamento_desconto: String,
    pub classificacao: String,
    pub data_hora: String,
    pub descricao: String,
    pub placa_relacionada: String,
    pub local: String,
    pub valor_original: String,
    pub valor_pago: String,
    pub status_pagamento: String,
    pub orgao_emissor: String,
    pub agente_emissor: String,
}
