// Tradeable instruments and their fair/settlement value rules

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::price_model::PriceModel;
use crate::error::{MarketError, MarketResult};
use crate::simulation::order_book::OrderBook;

/// How an instrument derives its theoretical and settlement values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InstrumentKind {
    /// Fair value drawn uniformly from `[theo_min, theo_max]`
    Future { theo_min: f64, theo_max: f64 },
    Call { underlying: String, strike: f64 },
    Put { underlying: String, strike: f64 },
    /// Long one leg, short the other
    Spread { long: String, short: String },
}

impl InstrumentKind {
    /// Labels this kind depends on
    pub fn dependencies(&self) -> Vec<&str> {
        match self {
            InstrumentKind::Future { .. } => Vec::new(),
            InstrumentKind::Call { underlying, .. } | InstrumentKind::Put { underlying, .. } => {
                vec![underlying.as_str()]
            }
            InstrumentKind::Spread { long, short } => vec![long.as_str(), short.as_str()],
        }
    }

    /// Value of a derived instrument given the values of its dependencies.
    /// Used for both theo and settlement; `None` for futures.
    pub fn derived_value(&self, values: &HashMap<String, f64>) -> Option<f64> {
        match self {
            InstrumentKind::Future { .. } => None,
            InstrumentKind::Call { underlying, strike } => {
                values.get(underlying).map(|u| (u - strike).max(0.0))
            }
            InstrumentKind::Put { underlying, strike } => {
                values.get(underlying).map(|u| (strike - u).max(0.0))
            }
            InstrumentKind::Spread { long, short } => {
                Some(values.get(long)? - values.get(short)?)
            }
        }
    }
}

/// Declared instrument, as it appears in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: InstrumentKind,
}

/// A live instrument: fixed theo and settlement plus its book
#[derive(Debug, Clone)]
pub struct Instrument {
    pub name: String,
    pub label: String,
    pub kind: InstrumentKind,
    pub theo: f64,
    pub settlement: f64,
    pub book: OrderBook,
}

impl Instrument {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        kind: InstrumentKind,
        theo: f64,
        settlement: f64,
        max_depth: usize,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            theo,
            settlement,
            book: OrderBook::new(max_depth),
        }
    }

    /// Create every declared instrument in order. Derived instruments must
    /// reference labels declared before them.
    pub fn build_all<R: Rng + ?Sized>(
        specs: &[InstrumentSpec],
        model: &PriceModel,
        max_depth: usize,
        rng: &mut R,
    ) -> MarketResult<Vec<Instrument>> {
        let mut theos: HashMap<String, f64> = HashMap::new();
        let mut settlements: HashMap<String, f64> = HashMap::new();
        let mut instruments = Vec::with_capacity(specs.len());

        for spec in specs {
            let (theo, settlement) = match &spec.kind {
                InstrumentKind::Future { theo_min, theo_max } => {
                    let theo = PriceModel::theoretical_value(rng, *theo_min, *theo_max);
                    (theo, model.settlement_value(rng, theo))
                }
                derived => {
                    let theo = derived.derived_value(&theos);
                    let settlement = derived.derived_value(&settlements);
                    match (theo, settlement) {
                        (Some(t), Some(s)) => (t, s),
                        _ => {
                            let missing = derived
                                .dependencies()
                                .into_iter()
                                .find(|dep| !theos.contains_key(*dep))
                                .unwrap_or_default()
                                .to_string();
                            return Err(MarketError::UnknownInstrument(missing));
                        }
                    }
                }
            };

            theos.insert(spec.label.clone(), theo);
            settlements.insert(spec.label.clone(), settlement);
            instruments.push(Instrument::new(
                spec.name.clone(),
                spec.label.clone(),
                spec.kind.clone(),
                theo,
                settlement,
                max_depth,
            ));
        }

        Ok(instruments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn values(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_option_values() {
        let v = values(&[("a", 120.0)]);
        let call = InstrumentKind::Call { underlying: "a".into(), strike: 100.0 };
        let put = InstrumentKind::Put { underlying: "a".into(), strike: 100.0 };
        assert_eq!(call.derived_value(&v), Some(20.0));
        assert_eq!(put.derived_value(&v), Some(0.0));

        let v = values(&[("a", 90.0)]);
        assert_eq!(call.derived_value(&v), Some(0.0));
        assert_eq!(put.derived_value(&v), Some(10.0));
    }

    #[test]
    fn test_spread_uses_both_legs() {
        let kind = InstrumentKind::Spread { long: "a".into(), short: "b".into() };
        let v = values(&[("a", 300.0), ("b", 180.0)]);
        assert_eq!(kind.derived_value(&v), Some(120.0));
        assert_eq!(kind.derived_value(&values(&[("a", 1.0)])), None);
    }

    #[test]
    fn test_build_spread_settles_off_its_own_legs() {
        let specs = vec![
            InstrumentSpec {
                name: "Future A".into(),
                label: "a".into(),
                kind: InstrumentKind::Future { theo_min: 250.0, theo_max: 400.0 },
            },
            InstrumentSpec {
                name: "Future B".into(),
                label: "b".into(),
                kind: InstrumentKind::Future { theo_min: 100.0, theo_max: 250.0 },
            },
            InstrumentSpec {
                name: "A-B Spread".into(),
                label: "s".into(),
                kind: InstrumentKind::Spread { long: "a".into(), short: "b".into() },
            },
        ];
        let model = PriceModel::new(&MarketConfig::default());
        let mut rng = StdRng::seed_from_u64(21);
        let built = Instrument::build_all(&specs, &model, 5, &mut rng).unwrap();

        assert_eq!(built.len(), 3);
        assert!((built[2].theo - (built[0].theo - built[1].theo)).abs() < 1e-9);
        assert!((built[2].settlement - (built[0].settlement - built[1].settlement)).abs() < 1e-9);
    }

    #[test]
    fn test_build_rejects_forward_reference() {
        let specs = vec![InstrumentSpec {
            name: "Call".into(),
            label: "c".into(),
            kind: InstrumentKind::Call { underlying: "a".into(), strike: 100.0 },
        }];
        let model = PriceModel::new(&MarketConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        let err = Instrument::build_all(&specs, &model, 5, &mut rng).unwrap_err();
        assert!(matches!(err, MarketError::UnknownInstrument(ref l) if l == "a"));
    }
}
