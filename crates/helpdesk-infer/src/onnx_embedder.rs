//! ONNX sentence embedder (all-MiniLM-L6-v2). Requires the `onnx` feature.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;

    use helpdesk_core::{Error, Result};
    use ndarray::Array1;
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::Tokenizer;
    use tracing::{info, warn};

    use crate::embedder::EmbedderBackend;
    use crate::DEFAULT_DIM;

    /// Maximum sequence length for the model.
    const MAX_SEQ_LEN: usize = 256;

    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        dimension: usize,
    }

    impl OnnxEmbedder {
        /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
        pub fn load(model_dir: &Path) -> Result<Self> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            for path in [&model_path, &tokenizer_path] {
                if !path.exists() {
                    return Err(Error::Inference(format!("missing {}", path.display())));
                }
            }

            // With load-dynamic, ORT_DYLIB_PATH must point to libonnxruntime.
            ort::init().commit();

            let session = Session::builder()
                .map_err(|e| Error::Inference(format!("session builder: {}", e)))?
                .with_intra_threads(2)
                .map_err(|e| Error::Inference(format!("session threads: {}", e)))?
                .commit_from_file(&model_path)
                .map_err(|e| Error::Inference(format!("failed to load ONNX model: {}", e)))?;

            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| Error::Inference(format!("failed to load tokenizer: {}", e)))?;

            info!("ONNX embedder loaded from {}", model_dir.display());

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                dimension: DEFAULT_DIM,
            })
        }

        fn infer(&self, text: &str) -> std::result::Result<Array1<f32>, String> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| format!("tokenization failed: {}", e))?;

            let seq_len = encoding.get_ids().len().min(MAX_SEQ_LEN);
            let ids: Vec<i64> = encoding.get_ids()[..seq_len].iter().map(|&v| v as i64).collect();
            let mask: Vec<i64> = encoding.get_attention_mask()[..seq_len]
                .iter()
                .map(|&v| v as i64)
                .collect();
            let type_ids = vec![0i64; seq_len];

            let shape = [1usize, seq_len];
            let ids_tensor = Tensor::from_array((shape, ids)).map_err(|e| e.to_string())?;
            let mask_tensor = Tensor::from_array((shape, mask.clone())).map_err(|e| e.to_string())?;
            let type_tensor = Tensor::from_array((shape, type_ids)).map_err(|e| e.to_string())?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_tensor])
                .map_err(|e| format!("inference failed: {}", e))?;

            let (out_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| format!("bad output tensor: {}", e))?;
            let dims: Vec<i64> = out_shape.iter().copied().collect();

            match dims.as_slice() {
                // token embeddings [1, seq, dim]: masked mean pooling
                [1, _, dim] => mean_pool(data, &mask, *dim as usize)
                    .ok_or_else(|| "empty attention mask".to_string()),
                // sentence embedding [1, dim]
                [1, dim] => Ok(Array1::from_vec(data[..*dim as usize].to_vec())),
                other => Err(format!("unexpected output shape {:?}", other)),
            }
        }
    }

    fn mean_pool(data: &[f32], mask: &[i64], dim: usize) -> Option<Array1<f32>> {
        let mut pooled = Array1::<f32>::zeros(dim);
        let mut count = 0.0f32;
        for (i, _) in mask.iter().enumerate().filter(|&(_, &m)| m > 0) {
            let row = &data[i * dim..(i + 1) * dim];
            pooled
                .iter_mut()
                .zip(row)
                .for_each(|(acc, &x)| *acc += x);
            count += 1.0;
        }
        (count > 0.0).then(|| pooled / count)
    }

    impl EmbedderBackend for OnnxEmbedder {
        fn embed(&self, text: &str) -> Option<Array1<f32>> {
            self.infer(text)
                .map_err(|e| warn!("ONNX embedding failed: {}", e))
                .ok()
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn is_available(&self) -> bool {
            true
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxEmbedder;
