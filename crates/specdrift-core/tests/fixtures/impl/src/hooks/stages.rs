// spec:4.3.6:The after stage MUST run after flag resolution occurs. It accepts a
// hook context (required), flag evaluation details (required) and hook hints
// (optional). It has no return value.:end
pub fn after() {}

// spec:4.9.9:Hooks MUST finish within a millisecond.:end
pub fn finally() {}
