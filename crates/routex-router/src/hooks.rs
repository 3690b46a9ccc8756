//! Lifecycle hooks and hook interception.
//!
//! Each route definition may carry an `on_enter` and an `on_leave` hook. During
//! a transition the pipeline binds every exiting/entering node to an
//! [`HookInvocation`] and hands it to the installed [`HookWrapper`] for its
//! kind, or invokes it directly when no wrapper is installed.

use crate::definition::ResolvedRoute;
use crate::error::HookRejectionError;
use crate::router::Router;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Error a hook rejects a transition with.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a lifecycle hook.
pub type HookResult = Result<(), HookError>;

/// Boxed hook future.
pub type HookFuture = BoxFuture<'static, HookResult>;

/// Extra arguments threaded unchanged into every hook of a transition.
pub type HookArgs = Vec<Value>;

/// A hook bound to its transition context, taking only the extra arguments.
pub type RawHook = Arc<dyn Fn(HookArgs) -> HookFuture + Send + Sync>;

/// Interceptor installed with `Router::wrap_on_enter_handler` or
/// `Router::wrap_on_leave_handler`.
pub type HookWrapper = Arc<dyn Fn(HookInvocation) -> HookFuture + Send + Sync>;

pub(crate) type EnterHook<C> = Arc<dyn Fn(EnterContext<C>) -> HookFuture + Send + Sync>;
pub(crate) type LeaveHook<C> = Arc<dyn Fn(LeaveContext<C>) -> HookFuture + Send + Sync>;

/// Which lifecycle hook is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
	/// `on_enter`, run for nodes entering the chain.
	Enter,
	/// `on_leave`, run for nodes exiting the chain.
	Leave,
}

impl std::fmt::Display for HookKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Enter => f.write_str("onEnter"),
			Self::Leave => f.write_str("onLeave"),
		}
	}
}

/// Context passed to `on_enter` hooks.
pub struct EnterContext<C: Clone + Send + Sync + 'static> {
	/// The route being left, if any.
	pub previous: Option<Arc<ResolvedRoute<C>>>,
	/// The route being entered.
	pub current: Arc<ResolvedRoute<C>>,
	/// The router running the transition.
	pub router: Router<C>,
	/// Extra transition arguments.
	pub args: HookArgs,
}

/// Context passed to `on_leave` hooks.
pub struct LeaveContext<C: Clone + Send + Sync + 'static> {
	/// The route being entered.
	pub current: Arc<ResolvedRoute<C>>,
	/// The router running the transition.
	pub router: Router<C>,
	/// Extra transition arguments.
	pub args: HookArgs,
}

/// A pending hook call, as seen by a [`HookWrapper`].
///
/// The wrapper may call [`invoke`](Self::invoke), call
/// [`invoke_with`](Self::invoke_with) with different arguments, or resolve
/// without running the hook at all.
pub struct HookInvocation {
	kind: HookKind,
	route_path: String,
	args: HookArgs,
	declared: bool,
	call: RawHook,
}

impl HookInvocation {
	pub(crate) fn new(
		kind: HookKind,
		route_path: impl Into<String>,
		args: HookArgs,
		declared: bool,
		call: RawHook,
	) -> Self {
		Self {
			kind,
			route_path: route_path.into(),
			args,
			declared,
			call,
		}
	}

	/// Returns which hook this is.
	pub fn kind(&self) -> HookKind {
		self.kind
	}

	/// Returns the display path of the route owning the hook.
	pub fn route_path(&self) -> &str {
		&self.route_path
	}

	/// Returns the transition's extra arguments.
	pub fn args(&self) -> &[Value] {
		&self.args
	}

	/// Returns whether the route declared this hook. Routes without one run a
	/// no-op.
	pub fn is_declared(&self) -> bool {
		self.declared
	}

	/// Returns the bound hook, callable any number of times.
	pub fn raw(&self) -> RawHook {
		Arc::clone(&self.call)
	}

	/// Runs the hook with the original arguments.
	pub fn invoke(self) -> HookFuture {
		(self.call)(self.args)
	}

	/// Runs the hook with `args` instead of the original arguments.
	pub fn invoke_with(self, args: HookArgs) -> HookFuture {
		(self.call)(args)
	}
}

impl std::fmt::Debug for HookInvocation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HookInvocation")
			.field("kind", &self.kind)
			.field("route_path", &self.route_path)
			.field("args", &self.args)
			.field("declared", &self.declared)
			.finish()
	}
}

/// Boxes a hook wrapper closure.
pub(crate) fn box_wrapper<F, Fut>(wrapper: F) -> HookWrapper
where
	F: Fn(HookInvocation) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = HookResult> + Send + 'static,
{
	Arc::new(move |invocation| wrapper(invocation).boxed())
}

/// The installed wrapper per hook kind. Installing replaces the previous one.
#[derive(Default)]
pub(crate) struct HookWrappers {
	enter: RwLock<Option<HookWrapper>>,
	leave: RwLock<Option<HookWrapper>>,
}

impl HookWrappers {
	pub(crate) fn set(&self, kind: HookKind, wrapper: HookWrapper) {
		let slot = match kind {
			HookKind::Enter => &self.enter,
			HookKind::Leave => &self.leave,
		};
		*slot.write() = Some(wrapper);
	}

	pub(crate) fn get(&self, kind: HookKind) -> Option<HookWrapper> {
		match kind {
			HookKind::Enter => self.enter.read().clone(),
			HookKind::Leave => self.leave.read().clone(),
		}
	}
}

/// Runs `invocation` through `wrapper`.
///
/// Errors and panics raised by the wrapper or the hook become a
/// [`HookRejectionError`].
pub(crate) async fn dispatch(
	wrapper: Option<HookWrapper>,
	invocation: HookInvocation,
) -> Result<(), HookRejectionError> {
	let kind = invocation.kind;
	let route_path = invocation.route_path.clone();

	let started = std::panic::catch_unwind(AssertUnwindSafe(|| match wrapper {
		Some(wrapper) => wrapper(invocation),
		None => invocation.invoke(),
	}));
	let outcome = match started {
		Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
		Err(payload) => Err(payload),
	};

	match outcome {
		Ok(Ok(())) => Ok(()),
		Ok(Err(err)) => Err(HookRejectionError::new(kind, route_path, err)),
		Err(payload) => {
			let message = match panic_message(payload.as_ref()) {
				Some(message) => format!("hook panicked: {message}"),
				None => "hook panicked".to_string(),
			};
			Err(HookRejectionError::new(kind, route_path, message.into()))
		}
	}
}

/// Extracts the message of a `panic!` payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
	payload
		.downcast_ref::<&str>()
		.copied()
		.or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::error::Error as _;

	fn recording_hook(seen: Arc<parking_lot::Mutex<Vec<HookArgs>>>) -> RawHook {
		Arc::new(move |args: HookArgs| -> HookFuture {
			seen.lock().push(args);
			Box::pin(futures::future::ok(()))
		})
	}

	fn invocation(raw: RawHook) -> HookInvocation {
		HookInvocation::new(
			HookKind::Enter,
			"users",
			vec![Value::from("a"), Value::from(1)],
			true,
			raw,
		)
	}

	#[rstest]
	#[case(HookKind::Enter, "onEnter")]
	#[case(HookKind::Leave, "onLeave")]
	fn test_hook_kind_display(#[case] kind: HookKind, #[case] expected: &str) {
		assert_eq!(kind.to_string(), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_dispatch_without_wrapper_passes_args() {
		// Arrange
		let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

		// Act
		let result = dispatch(None, invocation(recording_hook(Arc::clone(&seen)))).await;

		// Assert
		assert!(result.is_ok());
		assert_eq!(*seen.lock(), vec![vec![Value::from("a"), Value::from(1)]]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_wrapper_can_replace_args() {
		// Arrange
		let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
		let wrapper = box_wrapper(|invocation: HookInvocation| {
			assert_eq!(invocation.args().len(), 2);
			assert_eq!(invocation.route_path(), "users");
			invocation.invoke_with(vec![Value::from("b")])
		});

		// Act
		let result = dispatch(Some(wrapper), invocation(recording_hook(Arc::clone(&seen)))).await;

		// Assert
		assert!(result.is_ok());
		assert_eq!(*seen.lock(), vec![vec![Value::from("b")]]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_wrapper_can_skip_hook() {
		let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
		let wrapper = box_wrapper(|_invocation: HookInvocation| async { Ok(()) });

		let result = dispatch(Some(wrapper), invocation(recording_hook(Arc::clone(&seen)))).await;

		assert!(result.is_ok());
		assert!(seen.lock().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_hook_error_becomes_rejection() {
		// Arrange
		let raw: RawHook = Arc::new(|_: HookArgs| -> HookFuture {
			Box::pin(async { Err::<(), HookError>("denied".into()) })
		});

		// Act
		let err = dispatch(None, invocation(raw)).await.unwrap_err();

		// Assert
		assert_eq!(err.kind(), HookKind::Enter);
		assert_eq!(err.to_string(), "onEnter handlers on route users are not resolved.");
		assert_eq!(err.source().map(ToString::to_string), Some("denied".to_string()));
	}

	#[rstest]
	#[tokio::test]
	async fn test_panicking_hook_becomes_rejection() {
		// Arrange
		let raw: RawHook = Arc::new(|_: HookArgs| -> HookFuture {
			Box::pin(async {
				let explode = true;
				if explode {
					panic!("boom");
				}
				Ok::<(), HookError>(())
			})
		});

		// Act
		let err = dispatch(None, invocation(raw)).await.unwrap_err();

		// Assert
		assert_eq!(err.hook_error().to_string(), "hook panicked: boom");
	}

	#[rstest]
	fn test_installing_wrapper_replaces_previous() {
		let wrappers = HookWrappers::default();
		let first = box_wrapper(|invocation: HookInvocation| invocation.invoke());
		let second = box_wrapper(|invocation: HookInvocation| invocation.invoke());

		wrappers.set(HookKind::Leave, Arc::clone(&first));
		wrappers.set(HookKind::Leave, Arc::clone(&second));

		let installed = wrappers.get(HookKind::Leave).unwrap();
		assert!(Arc::ptr_eq(&installed, &second));
		assert!(wrappers.get(HookKind::Enter).is_none());
	}
}
