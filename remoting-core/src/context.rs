use core::fmt;

/// Default nesting limit, counting composites, sequences and references.
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// Options shared by every writer and reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireOptions {
    /// Maximum nesting depth before a call fails with `DepthLimitExceeded`.
    pub max_depth: usize,
}

impl Default for WireOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl WireOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A single step in a [`WirePath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// The root value, by the name it was serialized under.
    Root(String),
    /// A composite field.
    Field(&'static str),
    /// A sequence element.
    Index(usize),
}

/// Where in the value the codec currently is, e.g. `Struct4.vec[2].ptr`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WirePath {
    steps: Vec<PathStep>,
}

impl WirePath {
    /// Create an empty path.
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Push a step.
    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    /// Pop the last step.
    pub fn pop(&mut self) -> Option<PathStep> {
        self.steps.pop()
    }

    /// The recorded steps.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of steps.
    pub const fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if no step was recorded.
    pub const fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for WirePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("<root>");
        }
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Root(name) => f.write_str(name)?,
                PathStep::Field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Stack of active namespace URIs.
///
/// The top of the stack is the namespace of whatever is being written or read
/// right now; an empty stack is the default namespace. Pushes and pops must
/// pair up: popping an empty stack is a bug in the caller and panics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceStack {
    uris: Vec<String>,
}

impl NamespaceStack {
    /// Create an empty stack (default namespace).
    pub const fn new() -> Self {
        Self { uris: Vec::new() }
    }

    /// Make `uri` the active namespace.
    pub fn push(&mut self, uri: &str) {
        self.uris.push(String::from(uri));
    }

    /// Restore the namespace that was active before the last push.
    ///
    /// # Panics
    ///
    /// Panics if nothing was pushed.
    #[track_caller]
    pub fn pop(&mut self) -> String {
        match self.uris.pop() {
            Some(uri) => uri,
            None => panic!("namespace stack underflow: pop without matching push"),
        }
    }

    /// The active namespace, `None` for the default namespace.
    pub fn current(&self) -> Option<&str> {
        self.uris.last().map(String::as_str)
    }

    /// Number of active pushes.
    pub const fn len(&self) -> usize {
        self.uris.len()
    }

    /// True if only the default namespace is active.
    pub const fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

/// Per-call state owned by a writer or reader.
///
/// Nothing in here outlives a single top-level serialize/deserialize call in
/// a meaningful way: the namespace stack and path are balanced again when the
/// call returns, successfully or not.
#[derive(Debug, Clone, Default)]
pub struct WireContext {
    namespaces: NamespaceStack,
    path: WirePath,
    depth: usize,
    options: WireOptions,
}

impl WireContext {
    /// Create a context with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with the given options.
    pub fn with_options(options: WireOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The options this context was created with.
    pub const fn options(&self) -> &WireOptions {
        &self.options
    }

    /// The namespace stack.
    pub const fn namespaces(&self) -> &NamespaceStack {
        &self.namespaces
    }

    /// Mutable access to the namespace stack.
    pub const fn namespaces_mut(&mut self) -> &mut NamespaceStack {
        &mut self.namespaces
    }

    /// The active namespace, `None` for the default namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.namespaces.current()
    }

    /// The current path.
    pub const fn path(&self) -> &WirePath {
        &self.path
    }

    /// Mutable access to the current path.
    pub const fn path_mut(&mut self) -> &mut WirePath {
        &mut self.path
    }

    /// Current nesting depth.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Enter one nesting level. Returns `false` if that would exceed the limit.
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.options.max_depth {
            return false;
        }
        self.depth += 1;
        true
    }

    /// Leave a nesting level entered with [`WireContext::enter`].
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "leave without matching enter");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Check that everything pushed during a call was popped again.
    ///
    /// # Panics
    ///
    /// Panics if the namespace stack is not empty.
    #[track_caller]
    pub fn assert_balanced(&self) {
        assert!(
            self.namespaces.is_empty(),
            "namespace stack not balanced at end of call: {:?} still active",
            self.namespaces.uris
        );
        debug_assert_eq!(self.depth, 0, "depth not balanced at end of call");
    }

    /// Forget any per-call state, keeping the options.
    pub fn reset(&mut self) {
        self.namespaces = NamespaceStack::new();
        self.path = WirePath::new();
        self.depth = 0;
    }
}
