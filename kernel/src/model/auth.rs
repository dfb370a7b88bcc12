/// Redis に保持する不透明なアクセストークン。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);
