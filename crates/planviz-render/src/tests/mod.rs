mod html;
mod postprocess;
