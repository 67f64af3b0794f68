// spec:4.1.1:Hook context MUST provide: the flag key, flag value type,
// evaluation context, and the default value.:end
pub struct HookContext {
    pub flag_key: String,
    pub default_value: String,
}

// spec:4.1.2:The hook context SHOULD provide access to the client metadata.:end
impl HookContext {
    pub fn client_metadata(&self) -> Option<&str> {
        None
    }
}
