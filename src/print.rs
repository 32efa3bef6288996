use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};

use crate::domain::{MarketKey, MarketSet};
use crate::quality::QualitySummary;

pub fn tabulate_markets(markets: &MarketSet) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(24)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Market".into(), "Prob.".into()],
        ));
    for key in MarketKey::all() {
        if let MarketKey::CorrectScoreTopK = key {
            for (score, prob) in markets.top_scores() {
                table.push_row(Row::new(
                    Styles::default(),
                    vec![
                        format!("{}[{}]", key.wire_name(), score.wire_name()).into(),
                        format!("{prob:.3}").into(),
                    ],
                ));
            }
        } else if let Some(prob) = markets.get(&key) {
            table.push_row(Row::new(
                Styles::default(),
                vec![key.wire_name().into(), format!("{prob:.3}").into()],
            ));
        }
    }
    table
}

pub fn tabulate_quality(summary: &QualitySummary) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Bin".into(),
                "Count".into(),
                "Conf.".into(),
                "Acc.".into(),
                "Gap".into(),
            ],
        ));
    for bin in &summary.bins {
        let fmt_opt = |value: Option<f64>| {
            value
                .map(|value| format!("{value:.3}"))
                .unwrap_or_else(|| "-".into())
        };
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("[{:.2}, {:.2})", bin.lo, bin.hi).into(),
                format!("{}", bin.count).into(),
                fmt_opt(bin.avg_confidence).into(),
                fmt_opt(bin.avg_accuracy).into(),
                format!("{:.3}", bin.gap).into(),
            ],
        ));
    }
    table
}
