use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A media object held by the remote asset host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRef {
    pub public_id: String,
    pub url: String,
}

impl AssetRef {
    pub fn new(public_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            url: url.into(),
        }
    }
}

/// Slot for an optional asset reference. Serialized as `{}` when empty and
/// `{ "public_id", "url" }` when set; a half-populated slot does not deserialize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetSlot(Option<AssetRef>);

impl AssetSlot {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn url(&self) -> Option<&str> {
        self.0.as_ref().map(|asset| asset.url.as_str())
    }

    pub fn public_id(&self) -> Option<&str> {
        self.0.as_ref().map(|asset| asset.public_id.as_str())
    }

    /// Replaces the current reference, handing back the previous one.
    pub fn replace(&mut self, asset: AssetRef) -> Option<AssetRef> {
        self.0.replace(asset)
    }
}

impl From<AssetRef> for AssetSlot {
    fn from(asset: AssetRef) -> Self {
        Self(Some(asset))
    }
}

impl From<Option<AssetRef>> for AssetSlot {
    fn from(asset: Option<AssetRef>) -> Self {
        Self(asset)
    }
}

#[derive(Serialize, Deserialize)]
struct AssetSlotRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl Serialize for AssetSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match &self.0 {
            Some(asset) => AssetSlotRepr {
                public_id: Some(asset.public_id.clone()),
                url: Some(asset.url.clone()),
            },
            None => AssetSlotRepr {
                public_id: None,
                url: None,
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AssetSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = AssetSlotRepr::deserialize(deserializer)?;
        match (repr.public_id, repr.url) {
            (Some(public_id), Some(url)) => Ok(Self(Some(AssetRef { public_id, url }))),
            (None, None) => Ok(Self(None)),
            _ => Err(de::Error::custom(
                "asset reference must carry both public_id and url",
            )),
        }
    }
}
