#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

pub mod temp_files {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// A fresh directory under the system temp dir, unique per call
    pub fn unique_dir(label: &str) -> PathBuf {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "brrtgen_{label}_{}_{counter}_{nanos}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write `content` to `dir/name` and return the path
    pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Creates a temporary spec file in its own directory
    pub fn create_temp_spec(content: &str, ext: &str) -> PathBuf {
        let dir = unique_dir("spec");
        write_file(&dir, &format!("openapi.{ext}"), content)
    }

    pub fn create_temp_yaml(content: &str) -> PathBuf {
        create_temp_spec(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> PathBuf {
        create_temp_spec(content, "json")
    }

    /// Cleanup temporary directories (best effort)
    pub fn cleanup_temp_dirs(paths: &[PathBuf]) {
        for path in paths {
            let _ = std::fs::remove_dir_all(path);
        }
    }
}

pub mod fixtures {
    use brrtgen::generator::{Compilation, Compiler};
    use brrtgen::spec::Description;

    /// Pet store used across integration tests: a base path, a mixed-segment
    /// route, nested objects, an enum and response headers.
    pub const PET_STORE: &str = r##"openapi: 3.1.0
info:
  title: Pet Store
  version: 1.0.0
servers:
  - url: https://api.example.com/v2
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
            minimum: 1
            maximum: 100
        - name: tags
          in: query
          schema:
            type: array
            items:
              type: string
      responses:
        "200":
          description: A page of pets
          headers:
            X-Next:
              schema:
                type: string
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Pet"
    post:
      operationId: addPet
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/NewPet"
      responses:
        "201":
          description: Created
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
        "422":
          description: Rejected
  /pets/{petId}:
    get:
      operationId: getPet
      parameters:
        - name: petId
          in: path
          required: true
          schema:
            type: integer
      responses:
        "200":
          description: One pet
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
        "404":
          description: Not found
  /pets/{petId}/photo{size}.png:
    get:
      operationId: getPhoto
      parameters:
        - name: petId
          in: path
          required: true
          schema:
            type: integer
        - name: size
          in: path
          required: true
          schema:
            type: string
            enum: [small, large]
      responses:
        "200":
          description: Image bytes
components:
  schemas:
    Pet:
      type: object
      required: [id, name]
      properties:
        id:
          type: integer
          format: int64
        name:
          type: string
          minLength: 1
        status:
          type: string
          enum: [available, sold]
        owner:
          type: object
          required: [email]
          properties:
            email:
              type: string
              format: email
    NewPet:
      type: object
      required: [name, tags]
      properties:
        name:
          type: string
          minLength: 1
        tags:
          type: array
          items:
            type: string
            minLength: 2
"##;

    pub fn pet_store() -> Description {
        Description::parse_str("pet_store.yaml", PET_STORE).unwrap()
    }

    pub fn compile(description: &Description) -> Compilation {
        Compiler::default().compile(description).unwrap()
    }
}
