use std::collections::BTreeMap;

/// Builds the Hill-order chemical formula of a multiset of species symbols.
///
/// Carbon comes first and hydrogen second when carbon is present; every other
/// symbol follows in alphabetical order. Without carbon all symbols, hydrogen
/// included, are alphabetical. Counts of one are omitted: `C3H4O3`, `F6P`, `Li`.
pub fn chemical_formula<'a>(symbols: impl IntoIterator<Item = &'a str>) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for symbol in symbols {
        *counts.entry(symbol).or_insert(0) += 1;
    }

    let mut formula = String::new();
    let mut push = |symbol: &str, count: usize| {
        formula.push_str(symbol);
        if count > 1 {
            formula.push_str(&count.to_string());
        }
    };

    if let Some(carbon) = counts.remove("C") {
        push("C", carbon);
        if let Some(hydrogen) = counts.remove("H") {
            push("H", hydrogen);
        }
    }
    for (symbol, count) in counts {
        push(symbol, count);
    }
    formula
}
