//! Compile Context

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a scene object: the address of its shared allocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Returns the identity of a shared object.
    ///
    /// * `object` - The object.
    pub fn of<T: ?Sized>(object: &Arc<T>) -> Self {
        Self(Arc::as_ptr(object) as *const () as usize)
    }
}

/// A recorded call site.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    /// The object the action is invoked on.
    pub object: ObjectId,

    /// Name of the action.
    pub action: &'static str,
}

/// A lowered function together with its index in the kernel's function
/// table. Every case that records the same `(object, action)` pair holds the
/// same index and shares the same code.
pub struct Function<F: ?Sized> {
    index: usize,
    code: Arc<F>,
}

impl<F: ?Sized> Function<F> {
    /// Returns the index of the function in the kernel's function table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the lowered code.
    #[inline]
    pub fn code(&self) -> &F {
        &self.code
    }

    /// Returns true if both handles refer to the same lowered code.
    ///
    /// * `other` - The other function.
    pub fn same_code(&self, other: &Self) -> bool {
        self.index == other.index && Arc::ptr_eq(&self.code, &other.code)
    }
}

impl<F: ?Sized> Clone for Function<F> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            code: Arc::clone(&self.code),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Function<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("index", &self.index).finish()
    }
}

/// Builder state threaded through the construction of one kernel. It owns
/// the kernel's function table: each `(object, action)` pair is lowered
/// exactly once and every later request for the pair is served from the
/// table. Lowering may recurse through the same context, e.g. a material
/// lowering the textures it samples.
pub struct CompileContext {
    /// Name of the kernel being built.
    kernel: String,

    /// Function index of every recorded pair.
    functions: BTreeMap<(ObjectId, &'static str), usize>,

    /// Call sites in function index order.
    call_sites: Vec<CallSite>,

    /// Lowered code in function index order; each entry holds an `Arc<F>`.
    table: Vec<Box<dyn Any + Send + Sync>>,
}

impl CompileContext {
    /// Create a new `CompileContext` for a kernel.
    ///
    /// * `kernel` - Name of the kernel.
    pub fn new(kernel: &str) -> Self {
        Self {
            kernel: kernel.to_string(),
            functions: BTreeMap::new(),
            call_sites: vec![],
            table: vec![],
        }
    }

    /// Returns the name of the kernel being built.
    pub fn kernel(&self) -> &str {
        &self.kernel
    }

    /// Returns the function for `action` on `object`, calling `lower` only
    /// the first time the pair is recorded.
    ///
    /// * `object` - The object.
    /// * `action` - Name of the action.
    /// * `lower`  - Produces the code; receives the context for nested
    ///              recording.
    pub fn lower_object_action<F, L>(&mut self, object: ObjectId, action: &'static str, lower: L) -> Function<F>
    where
        F: ?Sized + Send + Sync + 'static,
        L: FnOnce(&mut Self) -> Arc<F>,
    {
        let key = (object, action);
        if let Some(&index) = self.functions.get(&key) {
            if let Some(code) = self.table[index].downcast_ref::<Arc<F>>() {
                return Function {
                    index,
                    code: Arc::clone(code),
                };
            }
            warn!(
                "'{}' recorded with two signatures in kernel '{}'; lowering again",
                action, self.kernel
            );
        }

        let code = lower(self);
        let index = self.call_sites.len();
        self.call_sites.push(CallSite { object, action });
        self.table.push(Box::new(Arc::clone(&code)));
        self.functions.insert(key, index);
        trace!("Kernel '{}' function {}: {}", self.kernel, index, action);
        Function { index, code }
    }

    /// Returns the number of distinct functions lowered.
    pub fn function_count(&self) -> usize {
        self.call_sites.len()
    }

    /// Returns the call site of a function.
    ///
    /// * `index` - Function index.
    pub fn call_site(&self, index: usize) -> Option<&CallSite> {
        self.call_sites.get(index)
    }

    /// Returns the call sites in function index order.
    pub fn call_sites(&self) -> &[CallSite] {
        &self.call_sites
    }

    /// Logs the function table at debug level.
    pub fn log_functions(&self) {
        for (index, site) in self.call_sites.iter().enumerate() {
            debug!(
                "Kernel '{}' function {}: {} on {:?}",
                self.kernel, index, site.action, site.object
            );
        }
    }

    /// Returns the number of functions lowered for an action.
    ///
    /// * `action` - Name of the action.
    pub fn action_count(&self, action: &str) -> usize {
        self.call_sites.iter().filter(|c| c.action == action).count()
    }
}
