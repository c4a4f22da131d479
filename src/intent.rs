//! Keyword-based intent detection for spoken or typed requests.

use crate::aggregate::Totals;
use crate::present::Locale;
use serde::{Deserialize, Serialize};

/// What the user is asking for.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    WeatherForecast,
    AddTransaction,
    FinancialSummary,
    AnalyzeCrop,
    PestDiseaseInfo,
    Help,
    Unknown,
}

serde_plain::derive_display_from_serialize!(Intent);
serde_plain::derive_fromstr_from_deserialize!(Intent);

fn any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

impl Intent {
    /// Classifies a transcript. Rules are checked in order and the first match wins.
    pub fn detect(transcript: &str) -> Self {
        let text = transcript.to_lowercase();
        if text.contains("previsão") && text.contains("tempo") {
            Intent::WeatherForecast
        } else if any(&text, &["adicionar", "registrar", "incluir"])
            && any(&text, &["transação", "gasto", "despesa", "receita"])
        {
            Intent::AddTransaction
        } else if any(&text, &["saldo", "financeiro", "balanço"]) {
            Intent::FinancialSummary
        } else if text.contains("analisar") && any(&text, &["planta", "cultura", "plantação"]) {
            Intent::AnalyzeCrop
        } else if any(&text, &["praga", "doença", "tratamento"]) {
            Intent::PestDiseaseInfo
        } else if any(&text, &["ajuda", "como", "o que"]) {
            Intent::Help
        } else {
            Intent::Unknown
        }
    }

    /// The reply for this intent. Only `FinancialSummary` depends on the ledger.
    pub fn respond(&self, totals: &Totals, locale: Locale) -> String {
        match self {
            Intent::WeatherForecast => "Posso verificar a previsão do tempo para sua região. Para os \
                próximos dias, espera-se temperaturas entre 25°C e 30°C, com probabilidade de \
                chuvas leves."
                .to_string(),
            Intent::AddTransaction => "Posso ajudar você a registrar uma nova transação \
                financeira. Que tipo de transação você deseja registrar?"
                .to_string(),
            Intent::FinancialSummary => format!(
                "Seu resumo financeiro atual é: Receitas {}, Despesas {}, Balanço {}",
                locale.format_currency(totals.income),
                locale.format_currency(totals.expenses),
                locale.format_currency(totals.balance),
            ),
            Intent::AnalyzeCrop => "Para analisar sua plantação, você pode enviar uma foto usando \
                a seção de análise de imagem. Posso identificar a cultura, estimar a saúde das \
                plantas e fornecer recomendações."
                .to_string(),
            Intent::PestDiseaseInfo => "Para obter informações sobre pragas e doenças, você pode \
                enviar fotos das plantas afetadas na seção de análise. Caso identifique algum \
                problema, posso recomendar tratamentos adequados."
                .to_string(),
            Intent::Help => "Posso ajudar com: informações sobre o clima, registrar transações \
                financeiras, analisar culturas por foto, informações sobre pragas e doenças, e \
                fornecer resumos financeiros. Como posso te ajudar hoje?"
                .to_string(),
            Intent::Unknown => "Não entendi completamente sua solicitação. Você pode perguntar \
                sobre previsão do tempo, registrar transações, obter resumos financeiros, análise \
                de culturas ou informações sobre pragas e doenças."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_detect() {
        let cases = [
            ("Qual a previsão do tempo amanhã?", Intent::WeatherForecast),
            ("Quero registrar uma despesa", Intent::AddTransaction),
            ("ADICIONAR RECEITA de milho", Intent::AddTransaction),
            ("Qual é o meu saldo?", Intent::FinancialSummary),
            ("Analisar a plantação de soja", Intent::AnalyzeCrop),
            ("Tem praga no milho", Intent::PestDiseaseInfo),
            ("Preciso de ajuda", Intent::Help),
            ("bom dia", Intent::Unknown),
        ];
        for (text, expected) in cases {
            assert_eq!(Intent::detect(text), expected, "{text}");
        }
    }

    #[test]
    fn test_first_match_wins() {
        // Both the weather and the help rules match.
        assert_eq!(
            Intent::detect("como está a previsão do tempo"),
            Intent::WeatherForecast
        );
        // "registrar" without a transaction word falls through to the help rule.
        assert_eq!(Intent::detect("como registrar"), Intent::Help);
    }

    #[test]
    fn test_financial_summary_response() {
        let totals = Totals {
            income: Decimal::from(1000),
            expenses: Decimal::from(200),
            balance: Decimal::from(800),
        };
        let response = Intent::FinancialSummary.respond(&totals, Locale::PtBr);
        assert_eq!(
            response,
            "Seu resumo financeiro atual é: Receitas R$ 1.000,00, Despesas R$ 200,00, \
            Balanço R$ 800,00"
        );
        assert!(Intent::Help.respond(&totals, Locale::PtBr).starts_with("Posso ajudar"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Intent::PestDiseaseInfo.to_string(), "pest_disease_info");
        assert_eq!("help".parse::<Intent>().unwrap(), Intent::Help);
    }
}
