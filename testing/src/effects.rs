//! Running effects outside the store
//!
//! Reducer unit tests usually stop at "a future effect was returned". These
//! helpers go one step further: they await the effects against whatever
//! environment the reducer captured (typically an in-memory API) and hand the
//! resulting actions back to the test.

use foodwagen_core::{effect::Effect, reducer::Reducer};
use futures::future::{BoxFuture, join_all};
use std::collections::VecDeque;

/// Await every effect and return the actions they produced.
///
/// Parallel effects are flattened. Actions are returned in effect order, not
/// completion order.
pub async fn drive_effects<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
    A: Send + 'static,
{
    let mut pending: Vec<BoxFuture<'static, Option<A>>> = Vec::new();
    flatten(effects, &mut pending);

    join_all(pending).await.into_iter().flatten().collect()
}

fn flatten<A, I>(effects: I, out: &mut Vec<BoxFuture<'static, Option<A>>>)
where
    I: IntoIterator<Item = Effect<A>>,
    A: Send + 'static,
{
    for effect in effects {
        match effect {
            Effect::None => {},
            Effect::Parallel(inner) => flatten(inner, out),
            Effect::Future(fut) => out.push(fut),
        }
    }
}

/// Reduce `action`, then keep feeding produced actions back until no effect
/// remains. Returns every fed-back action in the order it was reduced.
pub async fn settle<R>(
    reducer: &R,
    state: &mut R::State,
    action: R::Action,
    env: &R::Environment,
) -> Vec<R::Action>
where
    R: Reducer,
    R::Action: Clone + Send + 'static,
{
    let mut observed = Vec::new();
    let mut queue = VecDeque::from([action]);
    let mut first = true;

    while let Some(action) = queue.pop_front() {
        if !first {
            observed.push(action.clone());
        }
        first = false;

        let effects = reducer.reduce(state, action, env);
        queue.extend(drive_effects(effects).await);
    }

    observed
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodwagen_core::{Effects, smallvec};

    #[derive(Clone, Debug, PartialEq)]
    enum Step {
        Start,
        Fetched(u8),
        Done,
    }

    struct Steps;

    impl Reducer for Steps {
        type State = Vec<u8>;
        type Action = Step;
        type Environment = ();

        fn reduce(&self, state: &mut Vec<u8>, action: Step, _env: &()) -> Effects<Step> {
            match action {
                Step::Start => smallvec![Effect::merge(vec![
                    Effect::future(async { Some(Step::Fetched(1)) }),
                    Effect::future(async { Some(Step::Fetched(2)) }),
                ])],
                Step::Fetched(n) => {
                    state.push(n);
                    if n == 2 {
                        smallvec![Effect::future(async { Some(Step::Done) })]
                    } else {
                        smallvec![Effect::None]
                    }
                },
                Step::Done => smallvec![],
            }
        }
    }

    #[tokio::test]
    async fn drive_effects_flattens_parallel() {
        let mut state = Vec::new();
        let effects = Steps.reduce(&mut state, Step::Start, &());

        let actions = drive_effects(effects).await;

        assert_eq!(actions, vec![Step::Fetched(1), Step::Fetched(2)]);
    }

    #[tokio::test]
    async fn settle_runs_until_quiet() {
        let mut state = Vec::new();

        let observed = settle(&Steps, &mut state, Step::Start, &()).await;

        assert_eq!(state, vec![1, 2]);
        assert_eq!(observed, vec![Step::Fetched(1), Step::Fetched(2), Step::Done]);
    }
}
