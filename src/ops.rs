pub mod filter;
pub mod flat_map;
pub mod map;
pub mod observe_on;
pub mod subscribe_on;

pub use filter::{FilterOp, TryFilterOp};
pub use flat_map::FlatMapOp;
pub use map::{MapOp, TryMapOp};
pub use observe_on::ObserveOnOp;
pub use subscribe_on::SubscribeOnOp;

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn filter_then_map() {
    let mut items = vec![];
    let mut completed = false;
    observable::from_iter(1..=5)
      .filter(|x| x % 2 == 0)
      .map(|x| format!("number: {x}"))
      .subscribe_all(|v| items.push(v), |e| panic!("unexpected error: {e}"), || completed = true);

    assert_eq!(items, vec!["number: 2", "number: 4"]);
    assert!(completed);
  }

  #[test]
  fn map_between_types() {
    let mut items = vec![];
    observable::from_iter(1..=3)
      .map(|x| x.to_string())
      .map(|s| format!("value: {s}"))
      .subscribe_next(|v| items.push(v));

    assert_eq!(items, vec!["value: 1", "value: 2", "value: 3"]);
  }
}
