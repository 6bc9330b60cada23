use std::fs::File;
use std::io::BufReader;

use serde::{de::DeserializeOwned, Serialize};

use super::{ManagedFile, WriteMode};
use crate::{ManagedFileError, Result};

impl ManagedFile {
    /// Serialize `value` as one JSON document on its own line.
    pub fn write_object<T: Serialize + ?Sized>(
        &self,
        value: &T,
        mode: WriteMode,
    ) -> Result<()> {
        self.guarded("object write", |handle| {
            handle.path()?;
            let mut payload = serde_json::to_vec(value).map_err(|err| {
                ManagedFileError::NotSerializable(err.to_string())
            })?;
            payload.push(b'\n');
            handle.write_bytes(&payload, mode)
        })
    }

    /// Deserialize the first object stored in the file.
    pub fn read_object<T: DeserializeOwned>(&self) -> Result<T> {
        self.guarded("object read", |handle| {
            let file =
                File::open(handle.path()?).map_err(ManagedFileError::Read)?;
            serde_json::Deserializer::from_reader(BufReader::new(file))
                .into_iter::<T>()
                .next()
                .ok_or_else(|| {
                    ManagedFileError::Decode("no object stored".to_owned())
                })?
                .map_err(ManagedFileError::from)
        })
    }

    /// Deserialize every object appended to the file, in write order.
    pub fn read_objects<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.guarded("object read", |handle| {
            let file =
                File::open(handle.path()?).map_err(ManagedFileError::Read)?;
            serde_json::Deserializer::from_reader(BufReader::new(file))
                .into_iter::<T>()
                .map(|object| object.map_err(ManagedFileError::from))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{FileOptions, ManagedFile, ManagedFileError, WriteMode};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::fs;
    use tempdir::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Score {
        player: String,
        points: u32,
        tags: Vec<String>,
    }

    fn score(player: &str, points: u32) -> Score {
        Score {
            player: player.to_owned(),
            points,
            tags: vec!["ranked".to_owned()],
        }
    }

    fn scratch_file(dir: &TempDir) -> ManagedFile {
        ManagedFile::open(
            dir.path().join("objects.json"),
            FileOptions::default().with_create_if_missing(true),
        )
        .unwrap()
    }

    #[test]
    fn object_round_trip() {
        let dir = TempDir::new("object_round_trip").unwrap();
        let file = scratch_file(&dir);

        file.write_object(&score("ada", 10), WriteMode::Truncate)
            .unwrap();
        assert_eq!(file.read_object::<Score>().unwrap(), score("ada", 10));
    }

    #[test]
    fn appended_objects_keep_order() {
        let dir = TempDir::new("object_append").unwrap();
        let file = scratch_file(&dir);

        file.write_object(&score("ada", 1), WriteMode::Append)
            .unwrap();
        file.write_object(&score("bob", 2), WriteMode::Append)
            .unwrap();

        assert_eq!(file.read_object::<Score>().unwrap(), score("ada", 1));
        assert_eq!(
            file.read_objects::<Score>().unwrap(),
            vec![score("ada", 1), score("bob", 2)]
        );

        file.write_object(&score("cy", 3), WriteMode::Truncate)
            .unwrap();
        assert_eq!(file.read_objects::<Score>().unwrap(), vec![score("cy", 3)]);
    }

    #[test]
    fn map_with_non_string_keys_is_not_serializable() {
        let dir = TempDir::new("object_not_serializable").unwrap();
        let file = scratch_file(&dir);
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "value");

        let err = file
            .write_object(&map, WriteMode::Append)
            .unwrap_err();
        assert!(matches!(err, ManagedFileError::NotSerializable(_)));
        assert_eq!(file.read_all().unwrap(), "");
    }

    #[test]
    fn malformed_payload_is_decode_error() {
        let dir = TempDir::new("object_malformed").unwrap();
        let file = scratch_file(&dir);
        fs::write(dir.path().join("objects.json"), "{\"player\": ").unwrap();

        assert!(file.read_object::<Score>().unwrap_err().is_decode());
    }

    #[test]
    fn mistyped_payload_is_decode_error() {
        let dir = TempDir::new("object_mistyped").unwrap();
        let file = scratch_file(&dir);
        file.write_object(&42, WriteMode::Append).unwrap();

        assert!(file.read_object::<Score>().unwrap_err().is_decode());
        assert_eq!(file.read_object::<u64>().unwrap(), 42);
    }

    #[test]
    fn empty_file_has_no_object() {
        let dir = TempDir::new("object_empty").unwrap();
        let file = scratch_file(&dir);

        assert!(file.read_object::<Score>().unwrap_err().is_decode());
        assert!(file.read_objects::<Score>().unwrap().is_empty());
    }

    #[test]
    fn unbound_object_operations_fail() {
        let file = ManagedFile::unbound(FileOptions::default());
        assert!(file
            .write_object(&1, WriteMode::Append)
            .unwrap_err()
            .is_unbound());
        assert!(file.read_object::<i32>().unwrap_err().is_unbound());
    }
}
