//! Preset image-to-image workflows
//!
//! Each workflow is a canned prompt applied to one or more input images.

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub prompt: &'static str,
    /// Minimum number of input images the prompt refers to.
    pub min_images: usize,
}

pub const WORKFLOWS: &[WorkflowTemplate] = &[
    WorkflowTemplate {
        id: "anime-style",
        name: "Anime style",
        description: "Convert a photo to anime style",
        prompt: "Convert this image to anime style, with vibrant colors, clean lines, and typical anime character features",
        min_images: 1,
    },
    WorkflowTemplate {
        id: "oil-painting",
        name: "Oil painting",
        description: "Render as an oil painting",
        prompt: "Transform this image into an oil painting style with visible brush strokes, rich textures, and artistic color blending",
        min_images: 1,
    },
    WorkflowTemplate {
        id: "photo-enhance",
        name: "Photo enhance",
        description: "Improve photo quality and detail",
        prompt: "Enhance this photo with improved clarity, better lighting, enhanced colors, and sharper details while maintaining natural look",
        min_images: 1,
    },
    WorkflowTemplate {
        id: "background-blur",
        name: "Background blur",
        description: "Blur the background to isolate the subject",
        prompt: "Apply professional bokeh effect to blur the background while keeping the main subject sharp and in focus",
        min_images: 1,
    },
    WorkflowTemplate {
        id: "vintage-film",
        name: "Vintage film",
        description: "Retro film camera look",
        prompt: "Apply vintage film camera effect with grain, faded colors, light leaks, and nostalgic atmosphere",
        min_images: 1,
    },
    WorkflowTemplate {
        id: "cyberpunk",
        name: "Cyberpunk",
        description: "Futuristic cyberpunk restyle",
        prompt: "Transform into cyberpunk style with neon lights, futuristic elements, dark atmosphere, and high-tech aesthetic",
        min_images: 1,
    },
    WorkflowTemplate {
        id: "product-detail",
        name: "Product detail grid",
        description: "3x3 storyboard of product detail shots",
        prompt: "Create a seamless 3x3 grid storyboard of nine distinct product photographs, strictly based on the key subject (the product), environment and lighting of the provided input image. \
Keep the exact same product model, material details, colors, background elements and lighting in all nine frames. \
Use high-end commercial e-commerce photography quality with sharp focus, rich texture detail and professional lighting, and a realistic depth of field that softens the background progressively as the shots move closer. \
Output only one clean 3x3 grid image with no text, borders or overlays. \
Row 1: an extreme wide establishing shot of the product in its wider environment; a full hero shot of the whole product; a medium shot focused on the main body. \
Row 2: a medium close-up of an important functional area; a close-up of a design feature, surface texture, logo or interface; an extreme close-up isolating fine craftsmanship and finish. \
Row 3: a macro shot with very shallow depth of field on the smallest texture of a key feature; a dramatic low-angle heroic shot looking up at the product; a top-down near flat-lay shot showing its layout and outline.",
        min_images: 1,
    },
    WorkflowTemplate {
        id: "product-multi-angle",
        name: "Product multi-angle",
        description: "Multiple viewpoints of a product",
        prompt: "Generate multi-angle shots of this product: front view, left view, back view, right view, top view, bottom view, and left and right 45-degree views",
        min_images: 1,
    },
    WorkflowTemplate {
        id: "product-retouch",
        name: "Product retouch",
        description: "Commercial-grade product retouching",
        prompt: "Apply commercial-grade product retouching to this product and place the retouched product on a white background",
        min_images: 1,
    },
    WorkflowTemplate {
        id: "product-replace",
        name: "Product replace",
        description: "Place the product from image 1 into the scene of image 2",
        prompt: "Place the product from image 1 into the scene of image 2, replacing the original product. Relight it so the product blends naturally into the scene with natural light and shadow, keeping the product itself unchanged",
        min_images: 2,
    },
];

pub fn find(id: &str) -> Option<&'static WorkflowTemplate> {
    WORKFLOWS.iter().find(|w| w.id == id)
}

/// Look up a workflow and check it has enough input images.
pub fn resolve(id: &str, image_count: usize) -> Result<&'static WorkflowTemplate> {
    let workflow = find(id).ok_or_else(|| {
        let ids: Vec<&str> = WORKFLOWS.iter().map(|w| w.id).collect();
        Error::InvalidRequest(format!(
            "Unknown workflow '{}'. Available: {}",
            id,
            ids.join(", ")
        ))
    })?;

    if image_count < workflow.min_images {
        return Err(Error::InvalidRequest(format!(
            "Workflow '{}' needs at least {} input image(s), got {}",
            workflow.id, workflow.min_images, image_count
        )));
    }

    Ok(workflow)
}
