//! One-shot activation gate.
//!
//! A gate owns the element it decorates and the external module it wakes up.
//! The first trigger moves it from [`ActivationState::Idle`] to
//! [`ActivationState::Activated`], applies the activated style and calls the
//! module's entry point. Every later trigger is ignored.
//!
//! The transition is a single compare-and-set on an atomic byte, so the
//! at-most-once guarantee also holds when triggers arrive from several
//! threads (e.g. a native UI toolkit). In the browser the event loop already
//! serialises handlers and the atomic is uncontended.

use std::{
    ops::Deref,
    rc::Rc,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
};
use tracing::debug;

/// Lifecycle of a gate. `Activated` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ActivationState {
    Idle = 0,
    Activated = 1,
}

impl ActivationState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            _ => Self::Activated,
        }
    }
}

/// The interactive element whose appearance reflects activation.
pub trait ActivationTarget {
    fn mark_activated(&self);
}

impl<T: ActivationTarget + ?Sized> ActivationTarget for Rc<T> {
    fn mark_activated(&self) {
        (**self).mark_activated()
    }
}

impl<T: ActivationTarget + ?Sized> ActivationTarget for Arc<T> {
    fn mark_activated(&self) {
        (**self).mark_activated()
    }
}

/// A loaded external module exposing a zero-argument initialization routine.
///
/// Errors raised by `init` are not handled by the gate; they propagate to
/// whatever the host does with unhandled failures.
pub trait ExternalModule {
    fn init(&self);
}

impl<F: Fn()> ExternalModule for F {
    fn init(&self) {
        self()
    }
}

/// Something that delivers user-generated trigger events to a handler.
pub trait TriggerSource {
    type Error;

    /// Registers `handler` to run on every trigger event.
    fn subscribe<H>(&self, handler: H) -> Result<(), Self::Error>
    where
        H: Fn() + 'static;
}

/// Outcome of [`ActivationGate::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A handler was subscribed by this call.
    Bound,
    /// The gate already had a handler; nothing was subscribed.
    AlreadyBound,
}

/// Runs `module.init()` at most once, on the first trigger.
#[derive(Debug)]
pub struct ActivationGate<T, M> {
    state: AtomicU8,
    bound: AtomicBool,
    target: T,
    module: M,
}

impl<T, M> ActivationGate<T, M>
where
    T: ActivationTarget,
    M: ExternalModule,
{
    pub fn new(target: T, module: M) -> Self {
        Self {
            state: AtomicU8::new(ActivationState::Idle as u8),
            bound: AtomicBool::new(false),
            target,
            module,
        }
    }

    pub fn state(&self) -> ActivationState {
        ActivationState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_activated(&self) -> bool {
        self.state() == ActivationState::Activated
    }

    /// Handles one trigger event.
    ///
    /// Only the call that wins the `Idle -> Activated` transition touches the
    /// target and the module; the style is applied before `init` runs.
    pub fn trigger(&self) {
        let won = self
            .state
            .compare_exchange(
                ActivationState::Idle as u8,
                ActivationState::Activated as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if !won {
            debug!("activation gate already open, trigger ignored");
            return;
        }

        debug!("activation gate opened");
        self.target.mark_activated();
        self.module.init();
    }

    /// Subscribes a single persistent handler on `source`.
    ///
    /// `handle` is any shared pointer to the gate (`Rc` on a single-threaded
    /// event loop, `Arc` elsewhere); the handler keeps a clone of it.
    /// Safe to call repeatedly: only the first successful call subscribes.
    /// If the subscription fails the gate stays unbound and may be bound again.
    pub fn bind<P, S>(handle: &P, source: &S) -> Result<Registration, S::Error>
    where
        P: Deref<Target = Self> + Clone + 'static,
        S: TriggerSource,
    {
        if handle.bound.swap(true, Ordering::AcqRel) {
            debug!("activation gate already bound, skipping subscription");
            return Ok(Registration::AlreadyBound);
        }

        let gate = P::clone(handle);
        match source.subscribe(move || gate.trigger()) {
            Ok(()) => Ok(Registration::Bound),
            Err(e) => {
                handle.bound.store(false, Ordering::Release);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Flag(Cell<bool>);

    impl ActivationTarget for Flag {
        fn mark_activated(&self) {
            self.0.set(true);
        }
    }

    #[test]
    fn test_starts_idle() {
        let gate = ActivationGate::new(Rc::new(Flag::default()), || {});
        assert_eq!(gate.state(), ActivationState::Idle);
        assert!(!gate.is_activated());
    }

    #[test]
    fn test_first_trigger_activates() {
        let flag = Rc::new(Flag::default());
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let gate = ActivationGate::new(Rc::clone(&flag), move || counter.set(counter.get() + 1));

        gate.trigger();

        assert_eq!(gate.state(), ActivationState::Activated);
        assert!(flag.0.get());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_repeated_triggers_call_init_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let gate = ActivationGate::new(Rc::new(Flag::default()), move || {
            counter.set(counter.get() + 1)
        });

        for _ in 0..25 {
            gate.trigger();
        }

        assert_eq!(calls.get(), 1);
        assert!(gate.is_activated());
    }

    #[test]
    fn test_failed_subscription_can_be_retried() {
        struct Flaky(RefCell<u32>);

        impl TriggerSource for Flaky {
            type Error = &'static str;

            fn subscribe<H>(&self, _handler: H) -> Result<(), Self::Error>
            where
                H: Fn() + 'static,
            {
                let mut attempts = self.0.borrow_mut();
                *attempts += 1;
                if *attempts == 1 { Err("element detached") } else { Ok(()) }
            }
        }

        let gate = Rc::new(ActivationGate::new(Flag::default(), || {}));
        let source = Flaky(RefCell::new(0));

        assert_eq!(ActivationGate::bind(&gate, &source), Err("element detached"));
        assert_eq!(ActivationGate::bind(&gate, &source), Ok(Registration::Bound));
        assert_eq!(
            ActivationGate::bind(&gate, &source),
            Ok(Registration::AlreadyBound)
        );
        assert_eq!(*source.0.borrow(), 2);
    }
}
