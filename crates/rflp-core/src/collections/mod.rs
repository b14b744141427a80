/// Hash map keyed with `ahash`, for indexes over small integer keys.
pub type HashMap<K, V> = ahash::HashMap<K, V>;
